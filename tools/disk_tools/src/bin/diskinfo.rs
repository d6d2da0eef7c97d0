use disk_tools::{cli, open_volume, report};

fn main() {
    cli::main_with("<disk image>", 1..=1, |args| {
        let volume = open_volume(&args[0])?;
        print!("{}", report::volume_info(&volume.report()));
        Ok(())
    })
}
