use assert_cmd::prelude::*;
use once_cell::sync::Lazy;
use predicates::str::contains;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

const PLANETS: &[(&str, &str, Option<&str>)] = &[
    ("Mars", "mars.png", Some("255 64 0")),
    ("Moon", "moon.png", None),
];

/// Scene document built from `PLANETS`, so the expected summary lines and the
/// fixture cannot drift apart.
static SCENE_XML: Lazy<String> = Lazy::new(|| {
    let planets: String = PLANETS
        .iter()
        .map(|(name, texture, color)| {
            let color = color
                .map(|c| format!("\n      <color>{c}</color>"))
                .unwrap_or_default();
            format!(
                "    <planet>\n      <name>{name}</name>\n      <texture>{texture}</texture>{color}\n    </planet>\n"
            )
        })
        .collect();
    format!(
        r#"<scene>
  <assets>
    <root>textures</root>
    <environment>night.hdr</environment>
  </assets>
  <orbit>
    <radius>3</radius>
  </orbit>
  <planets>
{planets}  </planets>
  <scroll>
    <throttle_ms>800</throttle_ms>
    <duration_ms>600</duration_ms>
  </scroll>
</scene>
"#
    )
});

fn write_scene(xml: &str) -> NamedTempFile {
    let mut tmp = NamedTempFile::new().expect("temp scene");
    tmp.write_all(xml.as_bytes()).expect("write scene");
    tmp
}

#[test]
fn summary_describes_configured_scene() {
    let scene = write_scene(&SCENE_XML);
    let mut cmd = Command::cargo_bin("orbit-scene").expect("binary exists");
    cmd.arg("--config").arg(scene.path()).arg("--summary-only");
    cmd.assert()
        .success()
        .stdout(contains(format!(
            "Scene with {} planets ({} assets)",
            PLANETS.len(),
            PLANETS.len() + 2
        )))
        .stdout(contains(format!(" - {} pos=(3.00, 0.00, 0.00)", PLANETS[0].0)))
        .stdout(contains(format!(" - {} pos=(-3.00, 0.00, 0.00)", PLANETS[1].0)))
        .stdout(contains(PLANETS[1].1))
        .stdout(contains("night.hdr"))
        .stdout(contains("Scroll: throttle 800 ms, tween 600 ms, step -180.0 deg"));
}

#[test]
fn summary_without_config_uses_default_scene() {
    let mut cmd = Command::cargo_bin("orbit-scene").expect("binary exists");
    cmd.arg("--summary-only");
    cmd.assert()
        .success()
        .stdout(contains("Scene with 4 planets (6 assets)"))
        .stdout(contains(" - Earth pos=(0.00, 0.00, 4.50)"))
        .stdout(contains("step -90.0 deg"));
}

#[test]
fn missing_config_fails() {
    let mut cmd = Command::cargo_bin("orbit-scene").expect("binary exists");
    cmd.arg("--config")
        .arg("/definitely/not/here/scene.xml")
        .arg("--summary-only");
    cmd.assert()
        .failure()
        .stderr(contains("failed to load scene"));
}

#[test]
fn empty_planet_list_is_rejected() {
    let scene = write_scene("<scene><planets/></scene>");
    let mut cmd = Command::cargo_bin("orbit-scene").expect("binary exists");
    cmd.arg("--config").arg(scene.path()).arg("--summary-only");
    cmd.assert().failure().stderr(contains("at least one"));
}

#[test]
fn unknown_argument_fails() {
    let mut cmd = Command::cargo_bin("orbit-scene").expect("binary exists");
    cmd.arg("--fullscreen");
    cmd.assert()
        .failure()
        .stderr(contains("Unknown argument: --fullscreen"));
}
