pub fn get_signature(version: &str) -> String {
    format!(
        r#"
   _  __        _ _                  _
  | |/ /___  __| (_)_ __   __ _  ___| | __    📦 Kodipack (packager for Kodi addons)
  | ' // _ \/ _` | | '_ \ / _` |/ __| |/ /
  | . \ (_) | (_| | | |_) | (_| | (__|   <     dist · release · clean
  |_|\_\___/ \__,_|_| .__/ \__,_|\___|_|\_\
                    |_|                       v{}
"#,
        version
    )
}
