use serde_json::json;

use crate::configuration::config_store::ConfigStore;
use crate::configuration::main_configuration::{MapFormType, MAP_NVS_FORM};

const BASE_HTML: &str = include_str!("html/base.html");
const SETTINGS_FORM_HTML: &str = include_str!("html/form_settings.html");

/// A WiFi network seen by the last scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPoint {
    pub ssid: String,
    pub rssi: i8,
}

pub fn to_html<S: ConfigStore>(
    config: &S,
    message: Option<&str>,
    aps: &[AccessPoint],
) -> String {
    let mut template = BASE_HTML.to_string();

    template = template.replace("{FORM_SETTINGS}", SETTINGS_FORM_HTML);
    template = template.replace("{ERROR_MSG}", &escape_html(message.unwrap_or("")));
    template = template.replace("{AP_LIST}", &access_points_to_json(aps));

    for elem in MAP_NVS_FORM {
        let Some(template_id) = elem.template_id else {
            continue;
        };

        let value = match elem.data_type {
            MapFormType::String(default, _) => config.read_string(elem.nvs_key, default),
            MapFormType::Unsigned64(default) => config.read_u64(elem.nvs_key, default).to_string(),
        };

        template = template.replace(template_id, &escape_html(&value));
    }

    template
}

fn access_points_to_json(aps: &[AccessPoint]) -> String {
    json!(aps
        .iter()
        .map(|ap| json!({ "ssid": ap.ssid, "rssi": ap.rssi }))
        .collect::<Vec<_>>())
    .to_string()
    .replace('<', "\\u003c")
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::config_store::MemoryConfiguration;
    use crate::configuration::main_configuration::{apply_form, DEFAULT_SOIL_FEED};

    #[test]
    fn test_renders_stored_values_and_defaults() {
        let mut store = MemoryConfiguration::new();
        apply_form(&mut store, "ssid=home&name=herbs").unwrap();

        let html = to_html(&store, Some("Saved"), &[]);

        assert!(html.contains("value=\"home\""));
        assert!(html.contains("value=\"herbs\""));
        assert!(html.contains(&format!("value=\"{}\"", DEFAULT_SOIL_FEED)));
        assert!(html.contains("value=\"10000\""));
        assert!(html.contains("Saved"));
        assert!(!html.contains("{SSID}"));
        assert!(!html.contains("{FORM_SETTINGS}"));
    }

    #[test]
    fn test_secrets_are_not_rendered() {
        let mut store = MemoryConfiguration::new();
        apply_form(&mut store, "pass=hunter22&aio_key=aio_secret_key").unwrap();

        let html = to_html(&store, None, &[]);

        assert!(!html.contains("hunter22"));
        assert!(!html.contains("aio_secret_key"));
    }

    #[test]
    fn test_access_point_list() {
        let aps = [
            AccessPoint {
                ssid: "home".to_string(),
                rssi: -40,
            },
            AccessPoint {
                ssid: "</script>".to_string(),
                rssi: -80,
            },
        ];

        let list = access_points_to_json(&aps);

        assert!(list.starts_with('['));
        assert!(list.contains("\"ssid\":\"home\""));
        assert!(list.contains("\"rssi\":-40"));
        assert!(!list.contains("</script>"));
        assert_eq!(access_points_to_json(&[]), "[]");
    }

    #[test]
    fn test_values_are_escaped() {
        let mut store = MemoryConfiguration::new();
        store.store_string("NAME", "\"><b>bed", 32).unwrap();

        let html = to_html(&store, None, &[]);

        assert!(html.contains("value=\"&quot;&gt;&lt;b&gt;bed\""));
    }
}
