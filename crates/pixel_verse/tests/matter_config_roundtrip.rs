//! Matter and space configuration loading from TOML.

use std::io::Write;

use bevy::math::{IVec2, Vec2};
use pixel_verse::{
  ConfigError, MatterDef, MatterId, MatterState, Matters, MattersConfig, RegistryError, Space,
  TickMode, VerseConfig, rgb,
};
use tempfile::NamedTempFile;

fn write_temp(contents: &str) -> NamedTempFile {
  let mut file = NamedTempFile::new().unwrap();
  file.write_all(contents.as_bytes()).unwrap();
  file.flush().unwrap();
  file
}

#[test]
fn builtin_matters_survive_toml() {
  let config = MattersConfig::builtin();
  let text = toml::to_string(&config).unwrap();
  let parsed = MattersConfig::from_toml_str(&text).unwrap();
  assert_eq!(parsed, config);

  let a = Matters::from(config);
  let b = Matters::from(parsed);
  assert_eq!(a.len(), b.len());
  for ((id_a, m_a), (id_b, m_b)) in a.iter().zip(b.iter()) {
    assert_eq!(id_a, id_b);
    assert_eq!(m_a, m_b);
  }
}

#[test]
fn registry_ids_follow_file_order() {
  let file = write_temp(
    r##"
    [[matters]]
    name = "basalt"
    state = "solid"
    density = 3.0
    palette = ["#202020"]

    [[matters]]
    name = "slime"
    state = "liquid"
    density = 1.2
    friction = 0.4
    palette = ["#30ff30", "#20e020"]
    "##,
  );
  let matters = Matters::from(MattersConfig::load(file.path()).unwrap());

  assert_eq!(matters.len(), 2);
  assert_eq!(matters.id_of("basalt").unwrap(), MatterId(1));
  assert_eq!(matters.id_of("slime").unwrap(), MatterId(2));
  let slime = matters.get(MatterId(2)).unwrap();
  assert_eq!(slime.state, MatterState::Liquid);
  assert_eq!(slime.physics.friction, 0.4);
  assert_eq!(slime.physics.elasticity, 0.0);
  assert_eq!(slime.palette, vec![rgb(0x30, 0xff, 0x30), rgb(0x20, 0xe0, 0x20)]);
  assert!(matches!(
    matters.id_of("lava"),
    Err(RegistryError::UnknownMatter(_))
  ));
}

#[test]
fn duplicate_and_bad_entries_are_tolerated() {
  let def = |name: &str, palette: &[&str]| MatterDef {
    name: name.to_owned(),
    state: MatterState::Powder,
    density: 1.5,
    friction: 0.0,
    elasticity: 0.0,
    temperature: 20.0,
    palette: palette.iter().map(|c| (*c).to_owned()).collect(),
  };
  let config = MattersConfig {
    matters: vec![
      def("dust", &["#aaaaaa"]),
      def("dust", &["#bbbbbb"]),
      def("glitter", &["not-a-color"]),
    ],
  };
  let matters = Matters::from(config);

  assert_eq!(matters.len(), 2);
  let dust = matters.get(matters.id_of("dust").unwrap()).unwrap();
  assert_eq!(dust.palette, vec![rgb(0xaa, 0xaa, 0xaa)]);
  let glitter = matters.get(matters.id_of("glitter").unwrap()).unwrap();
  assert_eq!(glitter.palette.len(), 1);
}

#[test]
fn missing_file_is_io_error() {
  let dir = tempfile::tempdir().unwrap();
  let err = MattersConfig::load(dir.path().join("missing.toml")).unwrap_err();
  assert!(matches!(err, ConfigError::Io(_)));
  assert!(err.to_string().contains("read"));
}

#[test]
fn malformed_matters_are_parse_errors() {
  let err = MattersConfig::from_toml_str("[[matters]]\nname = 3").unwrap_err();
  assert!(matches!(err, ConfigError::Parse(_)));
  let err = MattersConfig::from_toml_str(
    "[[matters]]\nname = \"x\"\nstate = \"goo\"\ndensity = 1.0\npalette = []",
  )
  .unwrap_err();
  assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn verse_config_survives_toml() {
  let mut config = VerseConfig::default();
  config.simulation.mode = TickMode::Compensating;
  config.simulation.ticks_per_second = 30.0;
  config.space.origin = Vec2::new(-12.5, 4.0);
  config.space.region_count = IVec2::new(3, 2);
  config.collision.simplify_tolerance = 0.5;

  let text = toml::to_string(&config).unwrap();
  let file = write_temp(&text);
  assert_eq!(VerseConfig::load(file.path()).unwrap(), config);
}

#[test]
fn space_from_config_activates_regions() {
  let config = VerseConfig::from_toml_str(
    r#"
    [space]
    cells_per_meter = 10.0
    region_count = [2, 2]
    "#,
  )
  .unwrap();
  let space = Space::from_config(&config.space);

  assert_eq!(space.regions().count(), 4);
  assert_eq!(space.cells_per_meter(), 10.0);
  assert!(
    space
      .regions()
      .all(|r| r.state() == pixel_verse::RegionState::Active)
  );
  space.verify_links();
}
