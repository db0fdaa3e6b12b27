//! Clap command tree.

use clap::{value_parser, Arg, ArgAction, Command};

/// Build the `keepsake` command.
pub fn build_cli() -> Command {
    Command::new("keepsake")
        .about("Append-only persistent text log")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_name("FILE")
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("root")
                .long("root")
                .global(true)
                .value_name("DIR")
                .help("Disk root, or the directory behind the mount with --virtual [default: .keepsake]"),
        )
        .arg(
            Arg::new("virtual")
                .long("virtual")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Use the in-memory write-back filesystem"),
        )
        .arg(
            Arg::new("mount")
                .long("mount")
                .global(true)
                .value_name("PREFIX")
                .help("Mount prefix for --virtual [default: files]"),
        )
        .arg(
            Arg::new("durability")
                .long("durability")
                .short('d')
                .global(true)
                .value_name("MODE")
                .value_parser(["none", "manual", "after_write", "batched", "strict"])
                .help("When appends reach durable storage"),
        )
        .arg(
            Arg::new("chunk-size")
                .long("chunk-size")
                .global(true)
                .value_name("BYTES")
                .value_parser(value_parser!(usize))
                .help("Upper bound on read chunk size"),
        )
        .subcommand(
            Command::new("append")
                .about("Append text to a resource")
                .arg(Arg::new("resource").required(true))
                .arg(Arg::new("text").required(true))
                .arg(
                    Arg::new("newline")
                        .long("newline")
                        .short('n')
                        .action(ArgAction::SetTrue)
                        .help("Append a trailing newline"),
                ),
        )
        .subcommand(
            Command::new("cat")
                .about("Write a resource to stdout")
                .arg(Arg::new("resource").required(true)),
        )
        .subcommand(Command::new("sync").about("Push buffered writes to durable storage"))
        .subcommand(
            Command::new("demo")
                .about("Record a visit in files/count.txt and print the log so far"),
        )
        .subcommand(
            Command::new("frames")
                .about("Run the centered-text scene on a headless surface")
                .arg(
                    Arg::new("count")
                        .long("count")
                        .value_parser(value_parser!(u64))
                        .default_value("1")
                        .help("Frames to draw"),
                )
                .arg(
                    Arg::new("embedded")
                        .long("embedded")
                        .action(ArgAction::SetTrue)
                        .help("Use the host-scheduled loop"),
                )
                .arg(
                    Arg::new("resize")
                        .long("resize")
                        .value_name("WxH")
                        .help("Deliver a resize notification before the first frame"),
                ),
        )
}
