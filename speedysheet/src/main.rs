use clap::Parser;
use log::info;
use speedysheet_lib::parser::html::create_document;
use speedysheet_lib::sheet_edit::{self, DeleteRange, SheetEdit};
use speedysheet_lib::HostConfig;
use std::fs;
use std::process;

#[derive(Parser)]
#[command(name = "speedysheet")]
#[command(about = "Insert and delete rules in the stylesheet of an HTML <style> element")]
struct Args {
    /// Input HTML file.
    input: String,

    /// Which <style> element to edit, in document order.
    #[arg(long, default_value_t = 0)]
    style: usize,

    /// Rule to insert; repeat to build a batch.
    #[arg(long = "insert", value_name = "RULE")]
    insert: Vec<String>,

    /// Index the batch starts at (defaults to the end of the sheet).
    #[arg(long, value_name = "INDEX")]
    at: Option<usize>,

    /// Highest index of a range to delete before inserting.
    #[arg(long, value_name = "INDEX", requires = "delete_count")]
    delete_at: Option<usize>,

    /// Number of rules to delete, walking down from --delete-at.
    #[arg(long, value_name = "N", requires = "delete_at")]
    delete_count: Option<usize>,

    /// Don't let <style> elements expose their sheet directly; forces the
    /// document-wide sheet scan.
    #[arg(long)]
    no_direct_sheet: bool,
}

fn main() {
    env_logger::init();

    let args: Args = Args::parse();

    let html_content = match fs::read_to_string(&args.input) {
        Ok(html_content) => html_content,
        Err(e) => {
            eprintln!("Error reading HTML file: {}", e);
            process::exit(1);
        }
    };

    let config = HostConfig {
        expose_direct_sheet: !args.no_direct_sheet,
        ..HostConfig::default()
    };
    let document = match create_document(&html_content, &config) {
        Ok(document) => document,
        Err(e) => {
            eprintln!("Error building stylesheets: {}", e);
            process::exit(1);
        }
    };
    info!("loaded {} stylesheets", document.style_sheets().len());

    let delete = match (args.delete_at, args.delete_count) {
        (Some(removal_index), Some(count)) => Some(DeleteRange {
            removal_index,
            count,
        }),
        _ => None,
    };
    let edit = SheetEdit {
        style_index: args.style,
        delete,
        insert_rules: args.insert,
        insert_at: args.at,
    };

    match sheet_edit::apply(&document, &edit) {
        Ok(report) => {
            println!(
                "Injected {} of {} rules.",
                report.injected,
                edit.insert_rules.len()
            );
            for (index, rule) in report.rules.iter().enumerate() {
                println!("{:>4}  {}", index, rule);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
