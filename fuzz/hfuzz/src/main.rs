extern crate xbe_image;
#[macro_use] extern crate honggfuzz;

fn main() {
    let config = xbe_image::LoadConfig::default();
    loop {
        fuzz!(|data: &[u8]| {
            xbe_image::load(data, &config).ok();
        });
    }
}
