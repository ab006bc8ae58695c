use std::path::{Path, PathBuf};

use anyhow::bail;
use colored::Colorize;
use hvl_ledger::{ErrorKind, IntegrityReport, TraceError, TraceabilityService};
use hvl_qr::{load_png, save_png, QrCodec};
use hvl_store::JsonFileStore;
use hvl_types::{BatchId, BatchRecord};
use serde::Serialize;

use crate::cli::*;
use crate::config::{ConfigError, HarvestConfig};

type Service = TraceabilityService<JsonFileStore>;

struct App {
    service: Service,
    codec: QrCodec,
    codes_dir: PathBuf,
    format: OutputFormat,
}

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = HarvestConfig::load(cli.config.as_deref())?.with_overrides(cli.ledger, cli.codes_dir);
    tracing::debug!(ledger = %config.ledger_path.display(), codes = %config.codes_dir.display(), "resolved paths");

    let ctx = App {
        service: TraceabilityService::new(JsonFileStore::new(config.ledger_path)),
        codec: QrCodec::new(),
        codes_dir: config.codes_dir,
        format: cli.format,
    };

    match cli.command {
        Command::Create(args) => cmd_create(&ctx, args),
        Command::Update(args) => cmd_update(&ctx, args),
        Command::Scan(args) => cmd_scan(&ctx, &args.image),
        Command::Journey(args) => cmd_journey(&ctx, &args.batch_id),
        Command::Verify(args) => cmd_verify(&ctx, args),
        Command::List => cmd_list(&ctx),
        Command::Demo => cmd_demo(&ctx),
    }
}

/// One specific line per failure kind; anything else falls back to the
/// full error chain.
pub fn describe_error(err: &anyhow::Error) -> String {
    if let Some(config) = err.downcast_ref::<ConfigError>() {
        return format!("{config} (fix the file or pass --config)");
    }
    let Some(trace) = err.downcast_ref::<TraceError>() else {
        return format!("{err:#}");
    };
    match trace.kind() {
        ErrorKind::BatchNotFound => format!("{trace} (run `harvest list` to see known batches)"),
        ErrorKind::NoCodeFound => "no QR code found in image".to_string(),
        ErrorKind::StorageIo => format!("could not read or write data: {trace}"),
        ErrorKind::DuplicateIdentifier => format!("{trace}; try again"),
        ErrorKind::Integrity => format!("{trace}; the ledger was modified outside harvest"),
    }
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn code_path(ctx: &App, id: &BatchId) -> PathBuf {
    ctx.codes_dir.join(format!("{id}.png"))
}

/// Create a batch and write its QR image. Returns the id and image path.
fn issue(ctx: &App, args: &CreateArgs) -> anyhow::Result<(BatchId, PathBuf)> {
    let (id, image) = ctx.service.issue_batch(
        &args.crop,
        &args.quantity,
        &args.location,
        &args.date,
        &ctx.codec,
    )?;
    let path = code_path(ctx, &id);
    save_png(&image, &path).map_err(TraceError::from)?;
    Ok((id, path))
}

fn cmd_create(ctx: &App, args: CreateArgs) -> anyhow::Result<()> {
    let (id, path) = issue(ctx, &args)?;
    match ctx.format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "batch_id": id,
            "qr_code": path,
        })),
        OutputFormat::Text => {
            println!("{} Batch created with ID: {}", "✓".green().bold(), id.as_str().yellow().bold());
            println!("  QR code saved as {}", path.display().to_string().cyan());
            Ok(())
        }
    }
}

fn cmd_update(ctx: &App, args: UpdateArgs) -> anyhow::Result<()> {
    let id = args.batch_id;
    let record = ctx.service.update_batch(&id, &args.owner, &args.price)?;
    match ctx.format {
        OutputFormat::Json => print_json(&record),
        OutputFormat::Text => {
            println!(
                "{} Updated batch {} with new owner {} at {}",
                "✓".green().bold(),
                id.as_str().yellow(),
                args.owner.bold(),
                args.price
            );
            println!(
                "  Events: {}  Hash: {}",
                record.history().len(),
                record.content_hash().short_hex().dimmed()
            );
            Ok(())
        }
    }
}

fn cmd_scan(ctx: &App, image: &Path) -> anyhow::Result<()> {
    let image = load_png(image).map_err(TraceError::from)?;
    let record = ctx.service.scan(&ctx.codec, &image)?;
    if ctx.format == OutputFormat::Text {
        println!("Scanned batch ID: {}", record.batch_id().as_str().yellow().bold());
    }
    let report = ctx.service.verify_batch(record.batch_id())?;
    show_journey(ctx, &record, &report)
}

fn cmd_journey(ctx: &App, id: &BatchId) -> anyhow::Result<()> {
    let record = ctx.service.get_journey(id)?;
    let report = ctx.service.verify_batch(id)?;
    show_journey(ctx, &record, &report)
}

fn show_journey(ctx: &App, record: &BatchRecord, report: &IntegrityReport) -> anyhow::Result<()> {
    match ctx.format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "journey": record,
            "integrity": report,
        })),
        OutputFormat::Text => {
            println!("\n{}", "Product journey:".bold());
            println!("{}", serde_json::to_string_pretty(record)?);
            print_integrity(report);
            Ok(())
        }
    }
}

fn print_integrity(report: &IntegrityReport) {
    if report.is_intact() {
        println!(
            "{} {} intact ({} events, hash {})",
            "✓".green().bold(),
            report.batch_id.as_str().yellow(),
            report.event_count,
            report.stored_hash.short_hex().dimmed()
        );
    } else {
        println!("{} {} {}", "✗".red().bold(), report.batch_id.as_str().yellow(), "FAILED".red().bold());
        for violation in &report.violations {
            println!("    {:?}: {}", violation.kind, violation.description);
        }
    }
}

fn cmd_verify(ctx: &App, args: VerifyArgs) -> anyhow::Result<()> {
    let reports = match args.batch_id {
        Some(id) => vec![ctx.service.verify_batch(&id)?],
        None => ctx.service.verify_ledger()?.reports,
    };

    match ctx.format {
        OutputFormat::Json => print_json(&reports)?,
        OutputFormat::Text if reports.is_empty() => println!("Ledger is empty."),
        OutputFormat::Text => reports.iter().for_each(print_integrity),
    }

    let failed = reports.iter().filter(|r| !r.is_intact()).count();
    if failed > 0 {
        bail!("{failed} of {} batches failed integrity verification", reports.len());
    }
    Ok(())
}

fn cmd_list(ctx: &App) -> anyhow::Result<()> {
    let batches = ctx.service.list_batches()?;
    if ctx.format == OutputFormat::Json {
        return print_json(&batches);
    }
    if batches.is_empty() {
        println!("No batches recorded.");
        return Ok(());
    }
    for b in &batches {
        let mark = if b.intact { "✓".green() } else { "✗".red() };
        println!(
            "{} {}  {:<12} {:>3} events  {}",
            mark,
            b.batch_id.as_str().yellow(),
            b.crop,
            b.events,
            b.current_owner.as_deref().unwrap_or("(at farm)").dimmed()
        );
    }
    Ok(())
}

fn cmd_demo(ctx: &App) -> anyhow::Result<()> {
    let args = CreateArgs {
        crop: "Wheat".into(),
        quantity: "100kg".into(),
        location: "Odisha".into(),
        date: "2025-09-10".into(),
    };
    let (id, path) = issue(ctx, &args)?;
    let text = ctx.format == OutputFormat::Text;
    if text {
        println!("{} Batch created with ID: {}", "✓".green().bold(), id.as_str().yellow().bold());
        println!("  QR code saved as {}", path.display().to_string().cyan());
    }

    for (owner, price) in [("Distributor A", "₹20/kg"), ("Retailer B", "₹25/kg")] {
        ctx.service.update_batch(&id, owner, price)?;
        if text {
            println!("{} Updated batch {} with new owner {}", "✓".green().bold(), id.as_str().yellow(), owner.bold());
        }
    }

    cmd_scan(ctx, &path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(dir: &tempfile::TempDir) -> App {
        App {
            service: TraceabilityService::new(JsonFileStore::new(dir.path().join("blockchain.json"))),
            codec: QrCodec::new(),
            codes_dir: dir.path().join("codes"),
            format: OutputFormat::Json,
        }
    }

    fn wheat() -> CreateArgs {
        CreateArgs {
            crop: "Wheat".into(),
            quantity: "100kg".into(),
            location: "Odisha".into(),
            date: "2025-09-10".into(),
        }
    }

    #[test]
    fn issue_writes_png_named_after_batch() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        let (id, path) = issue(&ctx, &wheat()).unwrap();
        assert_eq!(path, dir.path().join("codes").join(format!("{id}.png")));
        assert!(path.is_file());
    }

    #[test]
    fn demo_records_two_custody_events() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        cmd_demo(&ctx).unwrap();

        let batches = ctx.service.list_batches().unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].events, 2);
        assert_eq!(batches[0].current_owner.as_deref(), Some("Retailer B"));
        assert!(batches[0].intact);
    }

    #[test]
    fn verify_fails_on_tampered_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        let (id, _) = issue(&ctx, &wheat()).unwrap();
        ctx.service.update_batch(&id, "Distributor A", "20/kg").unwrap();

        let path = ctx.service.store().path().to_path_buf();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::write(&path, text.replace("20/kg", "2/kg")).unwrap();

        assert!(cmd_verify(&ctx, VerifyArgs { batch_id: None }).is_err());
    }

    #[test]
    fn missing_batch_message_is_specific() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        let err = cmd_journey(&ctx, &BatchId::new("deadbeef").unwrap()).unwrap_err();
        let message = describe_error(&err);
        assert!(message.starts_with("batch not found: deadbeef"), "{message}");
    }

    #[test]
    fn bad_config_message_is_specific() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("harvest.toml");
        std::fs::write(&path, "ledger_path = [").unwrap();
        let err = anyhow::Error::from(HarvestConfig::load(Some(&path)).unwrap_err());
        let message = describe_error(&err);
        assert!(message.starts_with("invalid config"), "{message}");
        assert!(message.contains("harvest.toml"), "{message}");
    }

    #[test]
    fn scanning_missing_image_is_storage_failure() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        let err = cmd_scan(&ctx, &dir.path().join("absent.png")).unwrap_err();
        assert!(describe_error(&err).starts_with("could not read or write data"));
    }

    #[test]
    fn blank_image_reports_no_code() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        let path = dir.path().join("blank.png");
        save_png(&image::GrayImage::from_pixel(100, 100, image::Luma([255])), &path).unwrap();
        let err = cmd_scan(&ctx, &path).unwrap_err();
        assert_eq!(describe_error(&err), "no QR code found in image");
    }
}
