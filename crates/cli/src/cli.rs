//! Command-line definition for the `timetabler` binary.

use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, Command};

/// Entity collections that share the list/delete/import command set.
pub const ENTITY_COMMANDS: [&str; 4] = ["courses", "lecturers", "rooms", "groups"];

fn id_arg(help: &'static str) -> Arg {
    Arg::new("id")
        .help(help)
        .required(true)
        .value_parser(value_parser!(i64))
}

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .help("Print the final generation snapshot as JSON")
        .action(ArgAction::SetTrue)
}

fn timetables_command() -> Command {
    Command::new("timetables")
        .about("Create, activate, delete and generate timetables")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(Command::new("list").about("List timetables"))
        .subcommand(
            Command::new("create")
                .about("Create an empty timetable")
                .arg(Arg::new("name").help("Display name").required(true))
                .arg(
                    Arg::new("semester")
                        .long("semester")
                        .help("Semester label, e.g. First")
                        .required(true)
                        .num_args(1),
                )
                .arg(
                    Arg::new("year")
                        .long("year")
                        .help("Academic year")
                        .required(true)
                        .value_parser(value_parser!(i32))
                        .num_args(1),
                )
                .arg(
                    Arg::new("second_half")
                        .long("second-half")
                        .help("The timetable covers the second half of the academic year")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("generate")
                        .long("generate")
                        .help("Generate the timetable right after creating it")
                        .action(ArgAction::SetTrue),
                )
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("activate")
                .about("Make a timetable the active one")
                .arg(id_arg("Timetable id")),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a timetable")
                .arg(id_arg("Timetable id")),
        )
        .subcommand(
            Command::new("generate")
                .about("Generate a timetable and follow its progress")
                .arg(id_arg("Timetable id"))
                .arg(json_arg()),
        )
}

fn entity_command(name: &'static str) -> Command {
    Command::new(name)
        .about(format!("Manage {name}"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(Command::new("list").about(format!("List {name}")))
        .subcommand(
            Command::new("delete")
                .about(format!("Delete one of the {name}"))
                .arg(id_arg("Entity id")),
        )
        .subcommand(
            Command::new("import")
                .about(format!("Bulk-import {name} from a CSV or Excel file"))
                .arg(
                    Arg::new("file")
                        .help("Path to a .csv, .xlsx or .xls file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
}

fn departments_command() -> Command {
    Command::new("departments")
        .about("Manage departments")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(Command::new("list").about("List departments"))
        .subcommand(
            Command::new("delete")
                .about("Delete a department")
                .arg(id_arg("Department id")),
        )
}

pub fn build_cli() -> Command {
    let mut cmd = Command::new("timetabler")
        .about("Administrative client for the university timetable service")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("username")
                .long("username")
                .short('u')
                .help("Sign in with this username (otherwise TIMETABLER_TOKEN is used)")
                .env("TIMETABLER_USERNAME")
                .global(true)
                .num_args(1),
        )
        .subcommand(timetables_command())
        .subcommand(departments_command())
        .subcommand(Command::new("whoami").about("Show the signed-in user"));

    for name in ENTITY_COMMANDS {
        cmd = cmd.subcommand(entity_command(name));
    }
    cmd
}
