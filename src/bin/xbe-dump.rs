//! Loads an XBE and dumps the resulting memory image to stdout.

extern crate xbe_image;
extern crate env_logger;
#[macro_use] extern crate structopt;

use xbe_image::{load, Limits, LoadConfig};
use structopt::StructOpt;

use std::fs::read;
use std::path::PathBuf;
use std::error::Error;

#[derive(Debug, StructOpt)]
#[structopt(name = "xbe-dump", about = "Dump the memory image of an XBE to stdout.")]
struct Opts {
    /// Path to the XBE file.
    #[structopt(parse(from_os_str))]
    xbe: PathBuf,
    /// Maximum number of section headers to accept.
    #[structopt(long)]
    max_sections: Option<u32>,
    /// Maximum number of kernel thunk table entries to accept.
    #[structopt(long)]
    max_thunk_entries: Option<u32>,
    /// Maximum length of a section name.
    #[structopt(long)]
    max_section_name_len: Option<u32>,
}

impl Opts {
    fn config(&self) -> LoadConfig {
        let defaults = Limits::default();
        LoadConfig {
            limits: Limits {
                max_sections: self.max_sections.unwrap_or(defaults.max_sections),
                max_thunk_entries: self.max_thunk_entries.unwrap_or(defaults.max_thunk_entries),
                max_section_name_len: self.max_section_name_len.unwrap_or(defaults.max_section_name_len),
                ..defaults
            },
            ..LoadConfig::default()
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let opts = Opts::from_args();

    let data = read(&opts.xbe)?;
    let image = load(&data, &opts.config())?;

    println!("{:?} image ({:?}, {:?})", image.image_kind(), image.architecture(), image.platform());
    println!("entry point: {:#010X}", image.entry_point());

    println!("segments:");
    for segment in image.segments() {
        println!(
            "  {:#010X} +{:#09X}  file {:#09X} +{:#09X}  {:?}",
            segment.virt_addr, segment.virt_size, segment.raw_offset, segment.raw_size, segment.permissions
        );
    }

    println!("sections:");
    for section in image.sections() {
        println!(
            "  {:<10} {:#010X} +{:#09X}  {:?}",
            section.name_lossy(), section.virt_addr, section.virt_size, section.semantics
        );
    }

    println!("symbols:");
    for symbol in image.symbols().values() {
        println!("  {:#010X}  {:<14} {}", symbol.addr, format!("{:?}", symbol.kind), symbol.name);
    }

    Ok(())
}
