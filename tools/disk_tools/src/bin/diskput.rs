use std::fs;
use std::io::ErrorKind;

use anyhow::{Context, bail};
use disk_tools::{cli, open_volume_rw};

fn main() {
    cli::main_with("<disk image> <host source file> <target path in image>", 3..=3, |args| {
        let (image, source, target) = (&args[0], &args[1], &args[2]);

        let data = match fs::read(source) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                bail!("Source file {} not found.", cli::base_name(source))
            }
            Err(e) => return Err(e).with_context(|| format!("cannot read source file {source}")),
        };

        let mut volume = open_volume_rw(image)?;
        let entry = volume.put_file(target, &data)?;

        log::info!("stored {} bytes at {target} in {} block(s)", data.len(), entry.block_count);
        Ok(())
    })
}
