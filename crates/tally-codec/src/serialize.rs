//! Field-list serializer; the inverse of `parse`.

use crate::{RawSubmission, parse::CLIENT_TIME_FORMAT};

fn flag(b: bool) -> &'static str { if b { "True" } else { "False" } }

pub(crate) fn join_fields(sub: &RawSubmission) -> String {
  let j = &sub.judgements;
  let padding = " ".repeat(sub.client_flags.bits() as usize);
  [
    sub.map_md5.clone(),
    sub.player_name.clone(),
    sub.online_checksum.clone(),
    j.n300.to_string(),
    j.n100.to_string(),
    j.n50.to_string(),
    j.ngeki.to_string(),
    j.nkatu.to_string(),
    j.nmiss.to_string(),
    sub.raw_score.to_string(),
    sub.max_combo.to_string(),
    flag(sub.perfect).to_owned(),
    sub.grade.as_str().to_owned(),
    sub.mods.bits().to_string(),
    flag(sub.passed).to_owned(),
    sub.mode_vn.to_string(),
    sub.client_time.format(CLIENT_TIME_FORMAT).to_string(),
    format!("{}{padding}", sub.osu_version),
  ]
  .join(":")
}
