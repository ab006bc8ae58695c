use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use hvl_types::BatchId;

#[derive(Parser)]
#[command(
    name = "harvest",
    about = "Harvest Ledger: farm-to-shelf batch traceability",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Ledger document (overrides the config file)
    #[arg(long, global = true)]
    pub ledger: Option<PathBuf>,

    /// Directory for QR code images (overrides the config file)
    #[arg(long, global = true)]
    pub codes_dir: Option<PathBuf>,

    /// Config file; defaults to ./harvest.toml when present
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Register a harvested batch and write its QR code
    Create(CreateArgs),
    /// Record a change of custody
    Update(UpdateArgs),
    /// Read a QR code image and show that batch's journey
    Scan(ScanArgs),
    /// Show the full record of a batch
    Journey(JourneyArgs),
    /// Check content hashes of one batch or the whole ledger
    Verify(VerifyArgs),
    /// List all batches
    List,
    /// Run the farm-to-retailer walkthrough
    Demo,
}

#[derive(Args)]
pub struct CreateArgs {
    pub crop: String,
    pub quantity: String,
    pub location: String,
    /// Harvest date, stored as given
    pub date: String,
}

#[derive(Args)]
pub struct UpdateArgs {
    pub batch_id: BatchId,
    pub owner: String,
    pub price: String,
}

#[derive(Args)]
pub struct ScanArgs {
    pub image: PathBuf,
}

#[derive(Args)]
pub struct JourneyArgs {
    pub batch_id: BatchId,
}

#[derive(Args)]
pub struct VerifyArgs {
    pub batch_id: Option<BatchId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_create() {
        let cli =
            Cli::try_parse_from(["harvest", "create", "Wheat", "100kg", "Odisha", "2025-09-10"])
                .unwrap();
        if let Command::Create(args) = cli.command {
            assert_eq!(args.crop, "Wheat");
            assert_eq!(args.quantity, "100kg");
            assert_eq!(args.location, "Odisha");
            assert_eq!(args.date, "2025-09-10");
        } else { panic!("wrong command"); }
    }

    #[test]
    fn create_needs_all_origin_fields() {
        assert!(Cli::try_parse_from(["harvest", "create", "Wheat", "100kg"]).is_err());
    }

    #[test]
    fn parse_update() {
        let cli =
            Cli::try_parse_from(["harvest", "update", "3f9a0c1e", "Distributor A", "₹20/kg"])
                .unwrap();
        if let Command::Update(args) = cli.command {
            assert_eq!(args.batch_id.as_str(), "3f9a0c1e");
            assert_eq!(args.owner, "Distributor A");
            assert_eq!(args.price, "₹20/kg");
        } else { panic!("wrong command"); }
    }

    #[test]
    fn blank_batch_id_rejected_at_parse() {
        for argv in [
            vec!["harvest", "update", "", "A", "1"],
            vec!["harvest", "journey", "   "],
            vec!["harvest", "verify", ""],
        ] {
            let err = Cli::try_parse_from(argv).err().unwrap();
            assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
            assert!(err.to_string().contains("batch identifier must not be empty"));
        }
    }

    #[test]
    fn parse_scan() {
        let cli = Cli::try_parse_from(["harvest", "scan", "codes/3f9a0c1e.png"]).unwrap();
        if let Command::Scan(args) = cli.command {
            assert_eq!(args.image, PathBuf::from("codes/3f9a0c1e.png"));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_verify_all_and_one() {
        let cli = Cli::try_parse_from(["harvest", "verify"]).unwrap();
        assert!(matches!(cli.command, Command::Verify(VerifyArgs { batch_id: None })));

        let cli = Cli::try_parse_from(["harvest", "verify", "3f9a0c1e"]).unwrap();
        if let Command::Verify(args) = cli.command {
            assert_eq!(args.batch_id.as_ref().map(BatchId::as_str), Some("3f9a0c1e"));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_list_and_demo() {
        let cli = Cli::try_parse_from(["harvest", "list"]).unwrap();
        assert!(matches!(cli.command, Command::List));
        let cli = Cli::try_parse_from(["harvest", "demo"]).unwrap();
        assert!(matches!(cli.command, Command::Demo));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "harvest", "journey", "3f9a0c1e", "--ledger", "/tmp/l.json", "--codes-dir", "qr",
            "--format", "json", "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.ledger, Some(PathBuf::from("/tmp/l.json")));
        assert_eq!(cli.codes_dir, Some(PathBuf::from("qr")));
        assert!(matches!(cli.command, Command::Journey(_)));
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["harvest", "list"]).unwrap();
        assert!(!cli.verbose);
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(cli.ledger.is_none());
        assert!(cli.config.is_none());
    }
}
