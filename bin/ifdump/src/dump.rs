// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

use std::{collections::BTreeMap, path::PathBuf};

use clap::ArgMatches;
use log::debug;
use rawifd::{Container, DecodeOptions, Directory, ImageKind, Value};
use serde::Serialize;

use crate::AppError;

/// One line of `--summary` output
#[derive(Debug, Serialize)]
struct DirectorySummary {
  path: String,
  offset: u32,
  kind: ImageKind,
  width: Option<u32>,
  length: Option<u32>,
  compression: Option<u32>,
  entries: usize,
  skipped: usize,
}

fn print_output<T: Serialize + ?Sized>(obj: &T, options: &ArgMatches) -> crate::Result<()> {
  if options.get_flag("yaml") {
    let yaml = serde_yaml::to_string(obj)?;
    println!("{}", yaml);
  } else {
    let json = serde_json::to_string_pretty(obj)?;
    println!("{}", json);
  }
  Ok(())
}

fn structured_output(options: &ArgMatches) -> bool {
  options.get_flag("json") || options.get_flag("yaml")
}

/// Decode limits from environment, overridden by command line switches
fn decode_options(options: &ArgMatches) -> DecodeOptions {
  let mut params = DecodeOptions::from_env();
  if let Some(max) = options.get_one::<usize>("max_directories") {
    params.max_directories = *max;
  }
  if options.get_flag("all_subifds") {
    params.follow_all_sub_ifds = true;
  }
  params
}

/// Label every directory with its position, `IFD1/SubIFD0` style,
/// parents before their sub-directories.
fn labeled<'c, 'a>(container: &'c Container<'a>) -> Vec<(String, &'c Directory<'a>)> {
  fn visit<'c, 'a>(path: String, ifd: &'c Directory<'a>, out: &mut Vec<(String, &'c Directory<'a>)>) {
    out.push((path.clone(), ifd));
    for (i, sub) in ifd.sub_ifds().iter().enumerate() {
      visit(format!("{}/SubIFD{}", path, i), sub, out);
    }
  }
  let mut out = Vec::new();
  for (i, ifd) in container.directories().iter().enumerate() {
    visit(format!("IFD{}", i), ifd, &mut out);
  }
  out
}

fn summarize(container: &Container<'_>) -> Vec<DirectorySummary> {
  labeled(container)
    .into_iter()
    .map(|(path, ifd)| DirectorySummary {
      path,
      offset: ifd.offset(),
      kind: ifd.classify(),
      width: ifd.image_width(),
      length: ifd.image_length(),
      compression: ifd.compression(),
      entries: ifd.entries().len(),
      skipped: ifd.skipped().len(),
    })
    .collect()
}

fn all_fields<'a>(container: &Container<'a>) -> BTreeMap<String, BTreeMap<u16, Value<'a>>> {
  labeled(container).into_iter().map(|(path, ifd)| (path, ifd.all_fields())).collect()
}

/// Dump the directories of a given file
pub fn dump(options: &ArgMatches) -> crate::Result<()> {
  let in_file: &PathBuf = options.get_one("FILE").ok_or(AppError::General("FILE not available".into()))?;
  let limit = options.get_one::<usize>("limit").copied().unwrap_or(8);

  debug!("Infile: {:?}", in_file);
  if !in_file.exists() {
    return Err(AppError::NotFound(in_file.clone()));
  }

  let source = rawifd::load_file(in_file)?;
  let container = source.container(&decode_options(options))?;

  if options.get_flag("summary") {
    let summary = summarize(&container);
    if structured_output(options) {
      print_output(&summary, options)?;
    } else {
      for s in summary {
        println!(
          "{:<20} {:#010x} {:<14} {:>6} x {:<6} compression: {:<6} entries: {}",
          s.path,
          s.offset,
          format!("{:?}", s.kind),
          s.width.map(|v| v.to_string()).unwrap_or("-".into()),
          s.length.map(|v| v.to_string()).unwrap_or("-".into()),
          s.compression.map(|v| v.to_string()).unwrap_or("-".into()),
          s.entries
        );
      }
    }
  } else if options.get_flag("all_fields") {
    let fields = all_fields(&container);
    if structured_output(options) {
      print_output(&fields, options)?;
    } else {
      for (path, values) in fields {
        println!("{}", path);
        for (tag, value) in values {
          println!("  {:#06x} : {}", tag, value);
        }
      }
    }
  } else if structured_output(options) {
    print_output(&container, options)?;
  } else {
    for line in container.dump(limit) {
      println!("{}", line);
    }
  }
  Ok(())
}
