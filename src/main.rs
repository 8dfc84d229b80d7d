// Entry point and high-level CLI flow.
//
// - Load every input CSV as one pump table and classify it.
// - Validate columns, then run the amperage and efficiency analyzers.
// - Print the report and write whichever optional outputs were requested.
mod amperage;
mod classifier;
mod cli;
mod efficiency;
mod loader;
mod output;
mod report;
mod schema;
mod types;
mod util;


use clap::Parser;
use types::PumpTable;

fn main() {
    env_logger::init();
    let args = cli::CliArgs::parse();

    let loaded = match loader::load_inputs(&args.inputs) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to load input: {}", e);
            std::process::exit(1);
        }
    };

    let mut tables: Vec<PumpTable> = Vec::with_capacity(loaded.len());
    for (table, load_report) in loaded {
        println!(
            "Processing {}... ({} rows read, {} {} units)",
            load_report.label,
            util::format_int(load_report.total_rows),
            util::format_int(table.unit_count()),
            table.configuration()
        );
        if load_report.blank_rows > 0 {
            println!(
                "Note: {} blank rows skipped.",
                util::format_int(load_report.blank_rows)
            );
        }
        if load_report.unparsed_values > 0 {
            println!(
                "Note: {} non-numeric cells treated as missing readings.",
                util::format_int(load_report.unparsed_values)
            );
        }
        tables.push(table);
    }
    println!();

    let total_units: usize = tables.iter().map(PumpTable::unit_count).sum();
    if total_units == 0 {
        eprintln!("No pump data found in the input. Please check the file format.");
        std::process::exit(1);
    }

    for table in &tables {
        schema::log_issues(&schema::validate_table(table));
    }

    let amp = amperage::analyze_amperage(&tables);
    schema::log_issues(&schema::check_amperage(&amp));
    let eff = efficiency::analyze_efficiency(&tables);
    let text = report::assemble_report(&tables, &amp, &eff);

    if args.show_raw {
        for table in &tables {
            output::preview_pump_table(table, args.raw_rows);
        }
    }

    println!("{}\n", text);

    if let Some(path) = &args.output {
        match output::write_report(path, &text, args.customer.as_deref(), args.order.as_deref()) {
            Ok(()) => println!("(Report written to {})", path.display()),
            Err(e) => eprintln!("Write error: {}", e),
        }
    }

    if let Some(path) = &args.summary_json {
        let summary = report::build_summary(&tables, &amp, &eff, chrono::Utc::now());
        match output::write_json(path, &summary) {
            Ok(()) => println!("(Summary written to {})", path.display()),
            Err(e) => eprintln!("Write error: {}", e),
        }
    }

    if let Some(dir) = &args.export_dir {
        match output::export_matches(dir, &amp, &eff) {
            Ok(()) => println!("(Match tables exported to {})", dir.display()),
            Err(e) => eprintln!("Write error: {}", e),
        }
    }
}
