use std::fs::File;
use std::io::{BufWriter, Write};

use anyhow::Context;
use disk_tools::{cli, open_volume};

fn main() {
    cli::main_with("<disk image> <source path in image> <host output file>", 3..=3, |args| {
        let (image, source, output) = (&args[0], &args[1], &args[2]);
        let mut volume = open_volume(image)?;

        // Locate first so a missing file never leaves an empty output behind
        let entry = volume.find_file(source)?;

        let file = File::create(output).with_context(|| format!("cannot create {output}"))?;
        let mut out = BufWriter::new(file);
        let copied = volume.read_file(&entry, |chunk: &[u8]| {
            out.write_all(chunk).with_context(|| format!("cannot write {output}"))
        })?;
        out.flush().with_context(|| format!("cannot write {output}"))?;

        log::info!("copied {copied} bytes from {source} to {output}");
        Ok(())
    })
}
