use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;

use ivray::table::VectorTable;

#[derive(Parser)]
#[command(
    name = "ivray-inspect",
    version,
    about = "Decode an IVRY vector table and print its contents"
)]
struct Cli {
    /// Vector table file to inspect
    table: PathBuf,

    /// First frame index to print
    #[arg(long, default_value_t = 0)]
    start: u32,

    /// Last frame index to print (defaults to the last frame in the file)
    #[arg(long)]
    end: Option<u32>,

    /// Also print every vector in the selected range
    #[arg(long)]
    vectors: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let table = VectorTable::load(&cli.table)?;
    let frame_count = table.frame_count();

    println!(
        "{}: {} frames, brightness {:.3}, speed {:.3}, {} vectors",
        cli.table.display(),
        frame_count,
        table.brightness,
        table.speed,
        table.total_vectors()
    );

    if frame_count == 0 {
        return Ok(());
    }

    let end = cli.end.unwrap_or(frame_count - 1);
    if cli.start >= frame_count {
        bail!(
            "Start frame {} is out of range (0-{})",
            cli.start,
            frame_count - 1
        );
    }
    if end >= frame_count {
        bail!("End frame {} is out of range (0-{})", end, frame_count - 1);
    }
    if end < cli.start {
        bail!("End frame must be greater than or equal to start frame");
    }

    // The beam position accumulates over the whole table, not just the
    // printed range, so positions inside the range are absolute.
    let mut x: i64 = 0;
    let mut y: i64 = 0;

    for (index, frame) in table.frames().enumerate() {
        let index = index as u32;
        let in_range = (cli.start..=end).contains(&index);

        if in_range {
            println!("frame {:05}: {} vectors", index, frame.vector_count());
        }

        for vector in frame.vectors() {
            x += i64::from(vector.dx);
            y += i64::from(vector.dy);
            if in_range && cli.vectors {
                println!(
                    "  ({:+6}, {:+6}) -> ({}, {})",
                    vector.dx, vector.dy, x, y
                );
            }
        }

        if in_range {
            println!("  beam ends at ({}, {})", x, y);
        }

        if index == end {
            // Nothing past the range needs accumulating.
            break;
        }
    }

    Ok(())
}
