//! Positional parser for the decrypted score field list.
//!
//! Layout (colon-delimited):
//!   0 map md5, 1 player name, 2 online checksum,
//!   3..=8 n300 n100 n50 ngeki nkatu nmiss,
//!   9 score, 10 max combo, 11 perfect, 12 grade, 13 mods, 14 passed,
//!   15 vanilla mode, 16 client time (`yyMMddHHmmss`),
//!   17 build string padded with one space per client flag bit value.

use std::str::FromStr;

use chrono::NaiveDateTime;
use tally_core::{
  judgement::Judgements,
  mods::Mods,
  ruleset::Ruleset,
  score::{ClientFlags, Grade},
};

use crate::{
  RawSubmission,
  error::{Error, Result},
};

pub(crate) const FIELD_COUNT: usize = 18;
pub(crate) const CLIENT_TIME_FORMAT: &str = "%y%m%d%H%M%S";

fn number<T: FromStr>(field: &'static str, value: &str) -> Result<T> {
  value.parse().map_err(|_| Error::InvalidField {
    field,
    value: value.to_owned(),
  })
}

/// The client writes booleans with a capital initial.
fn flag(field: &'static str, value: &str) -> Result<bool> {
  match value {
    "True" => Ok(true),
    "False" => Ok(false),
    other => Err(Error::InvalidField {
      field,
      value: other.to_owned(),
    }),
  }
}

pub(crate) fn parse_fields(
  score_data: &str,
  client_hash: String,
) -> Result<RawSubmission> {
  let f: Vec<&str> = score_data.split(':').collect();
  if f.len() != FIELD_COUNT {
    return Err(Error::FieldCount {
      expected: FIELD_COUNT,
      got:      f.len(),
    });
  }

  let player_name = f[1].strip_suffix(' ').unwrap_or(f[1]).to_owned();
  if player_name.is_empty() {
    return Err(Error::InvalidField {
      field: "player_name",
      value: f[1].to_owned(),
    });
  }

  let judgements = Judgements {
    n300:  number("n300", f[3])?,
    n100:  number("n100", f[4])?,
    n50:   number("n50", f[5])?,
    ngeki: number("ngeki", f[6])?,
    nkatu: number("nkatu", f[7])?,
    nmiss: number("nmiss", f[8])?,
  };

  let grade = Grade::parse(f[12]).map_err(|_| Error::InvalidField {
    field: "grade",
    value: f[12].to_owned(),
  })?;
  let mods = Mods(number("mods", f[13])?);
  let mode_vn: u8 = number("mode", f[15])?;
  let ruleset = Ruleset::from_params(mode_vn, mods)?;

  let client_time = NaiveDateTime::parse_from_str(f[16], CLIENT_TIME_FORMAT)
    .map_err(|_| Error::InvalidField {
      field: "client_time",
      value: f[16].to_owned(),
    })?;

  let build = f[17];
  let osu_version = build.trim_end_matches(' ');
  let padding = build.len() - osu_version.len();

  Ok(RawSubmission {
    map_md5: f[0].to_owned(),
    player_name,
    online_checksum: f[2].to_owned(),
    judgements,
    raw_score: number("score", f[9])?,
    max_combo: number("max_combo", f[10])?,
    perfect: flag("perfect", f[11])?,
    grade,
    mods,
    passed: flag("passed", f[14])?,
    mode_vn,
    ruleset,
    client_time,
    osu_version: osu_version.to_owned(),
    client_flags: ClientFlags::from_padding(padding),
    client_hash,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn line(name: &str, mods: u32, mode: u8, build: &str) -> String {
    format!(
      "abc:{name}:chk:300:20:1:40:5:3:987654:412:False:SH:{mods}:True:{mode}:240309210455:{build}"
    )
  }

  #[test]
  fn parses_all_fields() {
    let raw = parse_fields(&line("peppy ", 8, 0, "20210520"), "h".into()).unwrap();
    assert_eq!(raw.player_name, "peppy");
    assert_eq!(raw.judgements.n300, 300);
    assert_eq!(raw.judgements.nmiss, 3);
    assert_eq!(raw.raw_score, 987_654);
    assert_eq!(raw.max_combo, 412);
    assert!(!raw.perfect);
    assert!(raw.passed);
    assert_eq!(raw.grade, Grade::Sh);
    assert_eq!(raw.mods, Mods::HIDDEN);
    assert_eq!(raw.ruleset, Ruleset::VanillaOsu);
    assert_eq!(raw.client_time.to_string(), "2024-03-09 21:04:55");
    assert_eq!(raw.osu_version, "20210520");
    assert!(raw.client_flags.is_clean());
    assert_eq!(raw.client_hash, "h");
  }

  #[test]
  fn strips_exactly_one_trailing_space() {
    let raw = parse_fields(&line("name  ", 0, 0, "20210520"), String::new()).unwrap();
    assert_eq!(raw.player_name, "name ");
  }

  #[test]
  fn padding_encodes_client_flags() {
    let raw = parse_fields(&line("p", 0, 0, "20210520      "), String::new()).unwrap();
    // 6 spaces = 0b110, bit 2 ignored.
    assert_eq!(raw.client_flags, ClientFlags::SPEED_HACK_DETECTED);
  }

  #[test]
  fn relax_mods_select_relax_ruleset() {
    let raw = parse_fields(&line("p", Mods::RELAX.bits(), 1, "20210520"), String::new()).unwrap();
    assert_eq!(raw.ruleset, Ruleset::RelaxTaiko);
  }

  #[test]
  fn relax_mania_is_invalid() {
    let err = parse_fields(&line("p", Mods::RELAX.bits(), 3, "20210520"), String::new());
    assert!(matches!(err, Err(Error::Core(_))));
  }

  #[test]
  fn wrong_field_count() {
    assert!(matches!(
      parse_fields("a:b:c", String::new()),
      Err(Error::FieldCount { expected: 18, got: 3 })
    ));
  }

  #[test]
  fn bad_number_names_the_field() {
    let bad = line("p", 0, 0, "20210520").replace(":987654:", ":lots:");
    match parse_fields(&bad, String::new()) {
      Err(Error::InvalidField { field, value }) => {
        assert_eq!(field, "score");
        assert_eq!(value, "lots");
      }
      other => panic!("unexpected: {other:?}"),
    }
  }

  #[test]
  fn lowercase_booleans_are_rejected() {
    let bad = line("p", 0, 0, "20210520").replace(":False:", ":false:");
    assert!(matches!(
      parse_fields(&bad, String::new()),
      Err(Error::InvalidField { field: "perfect", .. })
    ));
  }

  #[test]
  fn lowercase_grades_are_rejected() {
    let bad = line("p", 0, 0, "20210520").replace(":SH:", ":sh:");
    assert!(matches!(
      parse_fields(&bad, String::new()),
      Err(Error::InvalidField { field: "grade", .. })
    ));
  }
}
