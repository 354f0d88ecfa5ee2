// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

use log::warn;

pub(crate) fn rawifd_max_directories() -> Option<usize> {
  match std::env::var("RAWIFD_MAX_DIRECTORIES").map(|val| val.parse::<usize>()) {
    Ok(Ok(value)) => Some(value),
    Ok(Err(_)) => {
      warn!("Invalid value for RAWIFD_MAX_DIRECTORIES");
      None
    }
    Err(_) => None,
  }
}

pub(crate) fn rawifd_max_sub_depth() -> Option<usize> {
  match std::env::var("RAWIFD_MAX_SUB_DEPTH").map(|val| val.parse::<usize>()) {
    Ok(Ok(value)) => Some(value),
    Ok(Err(_)) => {
      warn!("Invalid value for RAWIFD_MAX_SUB_DEPTH");
      None
    }
    Err(_) => None,
  }
}

pub(crate) fn rawifd_follow_all_subifds() -> bool {
  match std::env::var("RAWIFD_FOLLOW_ALL_SUBIFDS").map(|val| val.parse::<u32>()) {
    Ok(Ok(value)) => value == 1,
    Ok(Err(_)) => {
      warn!("Invalid value for RAWIFD_FOLLOW_ALL_SUBIFDS");
      false
    }
    Err(_) => false,
  }
}
