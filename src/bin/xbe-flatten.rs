//! Flatten an XBE into its would-be virtual address space.
//!
//! This is useful for looking up code and data addresses with the static XBE
//! data.

extern crate env_logger;
extern crate xbe_image;

#[allow(unused_imports)]
#[macro_use]
extern crate structopt;

use structopt::StructOpt;
use xbe_image::{Image, LoadConfig, Xbe};

use std::error::Error;
use std::fs::{read, File};
use std::io::{self, BufWriter, Seek, SeekFrom, Write};
use std::path::PathBuf;

const DEFAULT_OUTPUT_EXTENSION: &str = "flat";

/// Filler byte used for data that is not mapped from the XBE.
const FILLER: u8 = 0;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "xbe-flatten",
    about = "Converts an XBE file to a file containing all segments at their virtual addresses."
)]
struct Opts {
    /// Path to the XBE file.
    #[structopt(parse(from_os_str))]
    xbe: PathBuf,
    /// The output file. If not specified, output goes to a file next to the
    /// XBE, with the extension changed to `.flat`.
    #[structopt(parse(from_os_str))]
    output: Option<PathBuf>,
}

fn fill_up_to<W: Write + Seek>(writer: &mut W, pos: u64) -> Result<(), io::Error> {
    let current = writer.seek(SeekFrom::Current(0))?;
    for _ in current..pos {
        writer.write_all(&[FILLER])?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let opt = Opts::from_args();

    eprintln!("Reading from {}", opt.xbe.display());
    let data = read(&opt.xbe)?;
    let config = LoadConfig::default();
    let xbe = Xbe::parse_with_limits(&data, &config.limits)?;
    let image = Image::from_xbe(&xbe, &config)?;
    let out = opt
        .output
        .unwrap_or(opt.xbe.with_extension(DEFAULT_OUTPUT_EXTENSION));
    eprintln!("  Writing to {}", out.display());
    let mut out = BufWriter::new(File::create(&out)?);

    // Fill with zeros up to the base address
    fill_up_to(&mut out, xbe.base_address().into())?;

    // Headers
    let header_size = xbe.header_size() as usize;
    if header_size > data.len() {
        eprintln!(
            "  Header size {:#X} exceeds the file size {:#X}, writing the truncated header",
            header_size,
            data.len()
        );
    }
    let header_end = header_size.min(data.len());
    out.write_all(data.get(..header_end).unwrap_or_default())?;

    // Segments, sorted by virtual start address. Each one is zero-filled up
    // to its virtual size. Overlapping segments are skipped where they would
    // have to rewind the output.
    let mut segments = image.segments().iter().collect::<Vec<_>>();
    segments.sort_by_key(|segment| segment.virt_addr);

    for segment in segments {
        let start = u64::from(segment.virt_addr);
        let current = out.seek(SeekFrom::Current(0))?;
        if current > start {
            eprintln!(
                "  Segment at {:#010X} overlaps the previous one, skipping",
                segment.virt_addr
            );
            continue;
        }
        fill_up_to(&mut out, start)?;

        let raw_start = segment.raw_offset as usize;
        let raw_len = segment.raw_size.min(segment.virt_size) as usize;
        // segment bounds were validated while parsing
        let bytes = data.get(raw_start..raw_start + raw_len).unwrap_or_default();
        out.write_all(bytes)?;
        fill_up_to(&mut out, start + u64::from(segment.virt_size))?;
    }

    Ok(())
}
