use emissions_core::aggregate::top_n;
use emissions_core::config::Config;
use emissions_core::csv_store::CsvEmissionsStore;
use emissions_core::report::{format_company_listing, summarize};
use emissions_core::EmissionsStore;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Example: reads EMISSIONS_DATA_FILE (default emissions_data.csv)
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("config error: {}", e);
            return Ok(());
        }
    };
    let store = CsvEmissionsStore::new(&cfg.data_file);
    println!("{}", format_company_listing(&store.list_sorted_by_name()?));

    let records = store.records()?;
    for ranked in top_n(&records, cfg.top_n) {
        let record = store.find_by_id(&ranked.id)?;
        println!("\n{} ({})\n{}", record.name, record.id, summarize(&record));
    }
    Ok(())
}
