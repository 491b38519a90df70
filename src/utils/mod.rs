// SPDX-License-Identifier: GPL-3.0-only
mod latest_link;

pub use latest_link::update_latest_symlink;
