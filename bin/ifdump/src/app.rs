// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

use std::path::PathBuf;

use clap::{Arg, ArgAction, Command, crate_version, value_parser};

pub fn create_app() -> Command {
  Command::new(crate::PKG_NAME)
    .version(crate_version!())
    .author("Daniel V. <daniel@chaospixel.com>")
    .about("Dump the image file directories of TIFF and camera raw files")
    .arg(
      Arg::new("debug")
        .short('d')
        .action(ArgAction::Count)
        .global(true)
        .help("Sets the level of debugging information"),
    )
    .arg(
      Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .conflicts_with("yaml")
        .help("Format output as JSON"),
    )
    .arg(Arg::new("yaml").long("yaml").action(ArgAction::SetTrue).help("Format output as YAML"))
    .arg(
      Arg::new("all_fields")
        .long("all-fields")
        .action(ArgAction::SetTrue)
        .help("Print every decoded entry by numeric tag, known or not"),
    )
    .arg(
      Arg::new("summary")
        .long("summary")
        .action(ArgAction::SetTrue)
        .help("Print one line per directory with its image kind"),
    )
    .arg(
      Arg::new("max_directories")
        .long("max-directories")
        .value_name("N")
        .value_parser(value_parser!(usize))
        .help("Upper bound of directories to decode"),
    )
    .arg(
      Arg::new("all_subifds")
        .long("all-subifds")
        .action(ArgAction::SetTrue)
        .help("Follow every SubIFDs offset instead of the first one"),
    )
    .arg(
      Arg::new("limit")
        .long("limit")
        .value_name("N")
        .value_parser(value_parser!(usize))
        .default_value("8")
        .help("Number of values printed per entry"),
    )
    .arg(
      Arg::new("FILE")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Input file"),
    )
}
