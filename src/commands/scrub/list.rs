use comfy_table::Table;
use comfy_table::presets::NOTHING;

use crate::models::registration::RegistrationEntry;
use crate::services::locator::Locator;
use crate::services::store::ResourceStore;

pub fn run(store: &dyn ResourceStore) {
    let apps = Locator::new(store, &[]).installed_applications();
    if apps.is_empty() {
        println!("No installed applications found.");
        return;
    }
    println!("{}", render(&apps));
    println!("Total: {} applications", apps.len());
}

fn render(apps: &[RegistrationEntry]) -> Table {
    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_header(vec!["Name", "Version", "Publisher"]);
    for app in apps {
        table.add_row(vec![
            app.display_name.clone(),
            app.version.clone().unwrap_or_default(),
            app.publisher.clone().unwrap_or_default(),
        ]);
    }
    table
}
