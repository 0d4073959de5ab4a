use anyhow::Result;
use clap::{Arg, ArgAction, Command};

use aam::commands;
use aam::core::config::Config;

fn cli() -> Command {
    Command::new("aam")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Manage, verify and package a rhythm-game song asset library")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("open")
                .about("Open an assets folder (the one containing songs/songlist)")
                .arg(
                    Arg::new("path")
                        .help("Path to the assets folder")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("create")
                        .long("create")
                        .help("Create an empty songlist if the folder has none")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("close").about("Forget the currently open assets folder"))
        .subcommand(Command::new("list").about("List the songs of the open library"))
        .subcommand(
            Command::new("import")
                .about("Import song folders into the library")
                .arg(
                    Arg::new("paths")
                        .help("Song folders, each containing a songlist")
                        .required(true)
                        .num_args(1..)
                        .index(1),
                )
                .arg(
                    Arg::new("link")
                        .short('l')
                        .long("link")
                        .help("Keep the folders linked; they are re-imported before every build")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("import-bg")
                .about("Copy background images into img/bg")
                .arg(
                    Arg::new("files")
                        .help("JPEG images")
                        .required(true)
                        .num_args(1..)
                        .index(1),
                ),
        )
        .subcommand(
            Command::new("delete")
                .about("Remove songs from the songlist")
                .arg(
                    Arg::new("ids")
                        .help("Song ids")
                        .required(true)
                        .num_args(1..)
                        .index(1),
                )
                .arg(
                    Arg::new("purge")
                        .long("purge")
                        .help("Also delete the song folders owned by the library")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("verify").about("Check that every required asset exists"))
        .subcommand(
            Command::new("build")
                .about("Package the library into an .ipa/.apk archive")
                .arg(
                    Arg::new("dest")
                        .help("Destination file; .ipa packs two levels above the library, anything else one level")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("yes")
                        .short('y')
                        .long("yes")
                        .help("Do not ask to confirm the package root")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("settings")
                .about("Show or change settings (use 'aam settings --help' for subcommands)")
                .subcommand(
                    Command::new("get")
                        .about("Print one value")
                        .arg(Arg::new("key").required(true).index(1)),
                )
                .subcommand(
                    Command::new("set")
                        .about("Change one value")
                        .arg(Arg::new("key").required(true).index(1))
                        .arg(Arg::new("value").required(true).index(2)),
                )
                .subcommand(
                    Command::new("reset")
                        .about("Restore defaults of a namespace")
                        .arg(
                            Arg::new("namespace")
                                .required(true)
                                .value_parser(["settings", "assets"])
                                .index(1),
                        ),
                ),
        )
}

fn main() -> Result<()> {
    let matches = cli().get_matches();

    let mut config = Config::load()?;
    aam::init_logging(&config.settings.log_level);

    match matches.subcommand() {
        Some(("open", sub_matches)) => commands::library::open(&mut config, sub_matches),
        Some(("close", _)) => commands::library::close(&mut config),
        Some(("list", _)) => commands::library::list(&config),
        Some(("import", sub_matches)) => commands::import::execute(&mut config, sub_matches),
        Some(("import-bg", sub_matches)) => {
            commands::import::execute_backgrounds(&config, sub_matches)
        }
        Some(("delete", sub_matches)) => commands::delete::execute(&mut config, sub_matches),
        Some(("verify", _)) => commands::verify::execute(&config),
        Some(("build", sub_matches)) => commands::build::execute(&config, sub_matches),
        Some(("settings", sub_matches)) => commands::settings::execute(&mut config, sub_matches),
        _ => {
            println!("Use 'aam --help' for more information.");
            Ok(())
        }
    }
}
