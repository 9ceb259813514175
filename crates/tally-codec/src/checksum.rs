//! The client's online score checksum.
//!
//! An md5 over the salted concatenation of the result's fields. The salts
//! and ordering are fixed by the game client.

use crate::{RawSubmission, parse::CLIENT_TIME_FORMAT};

fn py_bool(b: bool) -> &'static str { if b { "True" } else { "False" } }

pub(crate) fn compute(
  sub: &RawSubmission,
  osu_version: &str,
  storyboard_md5: &str,
) -> String {
  let j = &sub.judgements;
  let input = format!(
    "chickenmcnuggets{}o15{}{}smustard{}{}uu{}{}{}{}{}{}{}Q{}{}{}{}{}{}",
    j.n100 + j.n300,
    j.n50,
    j.ngeki,
    j.nkatu,
    j.nmiss,
    sub.map_md5,
    sub.max_combo,
    py_bool(sub.perfect),
    sub.player_name,
    sub.raw_score,
    sub.grade.as_str(),
    sub.mods.bits(),
    py_bool(sub.passed),
    sub.mode_vn,
    osu_version,
    sub.client_time.format(CLIENT_TIME_FORMAT),
    sub.client_hash,
    storyboard_md5,
  );
  format!("{:x}", md5::compute(input.as_bytes()))
}
