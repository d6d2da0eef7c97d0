use disk_tools::{cli, open_volume, report};

fn main() {
    cli::main_with("<disk image> [path]", 1..=2, |args| {
        let path = args.get(1).map_or("/", String::as_str);
        let mut volume = open_volume(&args[0])?;
        for entry in volume.list(path)? {
            if let Some(line) = report::listing_line(&entry) {
                println!("{line}");
            }
        }
        Ok(())
    })
}
