use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tiny",
    about = "Compress images in place through the TinyPNG web service",
    long_about = "tiny uploads GIF, JPEG and PNG images to a remote shrink service and replaces \
                  each file with the compressed result when it saves at least 1%. \
                  Files are sent in small batches with a cooldown in between, and failures are \
                  remembered so they can be retried later with `tiny retry`.",
    version,
    args_conflicts_with_subcommands = true,
    after_help = "EXAMPLES:\n  \
    tiny\n  \
    tiny .\n  \
    tiny a.jpg b.jpg\n  \
    tiny img -r -b\n  \
    tiny retry"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(
        help = "Image files or a directory (default: current directory)",
        long_help = "Image files to compress, or a single directory whose images should be \
                     compressed. Without arguments the current directory is used."
    )]
    pub paths: Vec<String>,

    #[arg(
        short = 'r',
        long,
        help = "Process subdirectories recursively",
        long_help = "Recursively process all subdirectories when the input is a directory."
    )]
    pub recursive: bool,

    #[arg(
        short = 'b',
        long,
        help = "Back up the directory before compressing",
        long_help = "Copy the target directory to a sibling `<name>_backup` directory \
                     before any file is replaced."
    )]
    pub backup: bool,

    #[command(flatten)]
    pub tuning: Tuning,

    #[arg(short = 'q', long, global = true, help = "Only print errors")]
    pub quiet: bool,

    #[arg(long, global = true, help = "Print per-file details and run phases")]
    pub verbose: bool,
}

#[derive(clap::Args, Clone, Debug, Default)]
pub struct Tuning {
    #[arg(
        long,
        global = true,
        help = "Files uploaded concurrently per batch (default: 5)"
    )]
    pub batch_size: Option<usize>,

    #[arg(
        long,
        global = true,
        value_name = "SECS",
        help = "Pause between batches in seconds (default: 5)"
    )]
    pub cooldown: Option<u64>,

    #[arg(
        long,
        global = true,
        value_name = "SECS",
        help = "Per-request timeout in seconds (default: 15)"
    )]
    pub timeout: Option<u64>,

    #[arg(
        long,
        global = true,
        value_name = "URL",
        help = "Shrink endpoint (default: https://tinypng.com/web/shrink)"
    )]
    pub api_url: Option<String>,

    #[arg(
        long,
        global = true,
        help = "Send a random X-Forwarded-For/X-Real-IP with each upload"
    )]
    pub spoof_ip: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Retry the files that failed in the previous run",
        long_about = "Read the failure list left by the previous run and compress those files again."
    )]
    Retry,
}
