use crate::core::config::Config;
use crate::core::spaces::SpaceDirectory;

pub fn list_spaces(config: &Config) {
    let directory = config.space_directory();
    if config.spaces.is_empty() {
        println!("Built-in spaces:\n");
    } else {
        println!("Configured spaces:\n");
    }
    for line in space_table(&directory) {
        println!("{line}");
    }
}

pub fn space_table(directory: &SpaceDirectory) -> Vec<String> {
    let id_width = directory
        .entries()
        .iter()
        .map(|entry| entry.id.to_string().len())
        .max()
        .unwrap_or(0)
        .max("ID".len());

    let mut lines = vec![format!("{:>id_width$}  Name", "ID")];
    lines.extend(
        directory
            .entries()
            .iter()
            .map(|entry| format!("{:>id_width$}  {}", entry.id.to_string(), entry.name)),
    );
    lines
}
