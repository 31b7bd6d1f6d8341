//! Common test fixtures: device classes and a catalog serving them.
#![allow(dead_code)]

use thingtalk_builder::prelude::*;

pub const XKCD_CLASS: &str = r#"
class @com.xkcd {
  monitorable query get_comic(in opt number: Number,
                              out title: String,
                              out picture_url: Entity(tt:picture),
                              out link: Entity(tt:url))
  #_[canonical="get xkcd comic"];

  query random_comic(out number: Number, out title: String)
  #_[canonical="random xkcd comic"];
}
"#;

pub const WEATHER_CLASS: &str = r#"
class @org.weather {
  monitorable query current(in req location: Location,
                            out temperature: Measure(C),
                            out status: Enum(sunny,cloudy,raining),
                            out humidity: Number,
                            out summary: String)
  #_[canonical="current weather"]
  #[poll_interval=60min];
}
"#;

pub const NEWS_CLASS: &str = r#"
class @com.news {
  list query get_article(in opt section: String,
                         out title: String,
                         out summary: String,
                         out rank: Number)
  #_[canonical="get news article"];
}
"#;

pub const TWITTER_CLASS: &str = r#"
class @com.twitter {
  action post(in req status: String)
  #_[canonical="tweet"];

  action follow(in req user: Entity(tt:username))
  #_[canonical="follow a user"];
}
"#;

pub const LIGHT_CLASS: &str = r#"
class @org.thingpedia.light {
  monitorable query get_power(out power: Enum(on,off))
  #_[canonical="get light power"];

  action set_power(in req power: Enum(on,off))
  #_[canonical="turn the light on or off"];

  action blink()
  #_[canonical="blink the light"];

  action schedule(in req when: Date)
  #_[canonical="schedule the light"];
}
"#;

/// A catalog serving every fixture class.
pub fn create_catalog() -> StaticCatalog {
    StaticCatalog::new()
        .with_device("com.xkcd", "XKCD", XKCD_CLASS)
        .with_device("org.weather", "Weather", WEATHER_CLASS)
        .with_device("com.news", "News", NEWS_CLASS)
        .with_device("com.twitter", "Twitter", TWITTER_CLASS)
        .with_device("org.thingpedia.light", "Smart Light", LIGHT_CLASS)
}

pub fn create_session() -> Session<StaticCatalog> {
    Session::new(create_catalog())
}

/// Starts `stage`, picks the device `kind` and selects `function` on it.
pub fn select(session: &Session<StaticCatalog>, stage: Stage, kind: &str, function: &str) {
    session.start_stage(stage);
    let functions = tokio_test::block_on(session.select_device(kind))
        .expect("Failed to select device")
        .current()
        .expect("Device selection was superseded");
    assert!(
        functions.iter().any(|f| f.name == function),
        "{function} is not offered for {stage}"
    );
    session
        .select_function(function)
        .expect("Failed to select function");
}

/// Parses one fixture class.
pub fn class(source: &str) -> ClassDef {
    parse_class(source).expect("Failed to parse fixture class")
}

pub const SIMPLE_RECIPE_JSON: &str = r#"
{
  "stream": {
    "kind": "org.weather",
    "function": "current",
    "inputs": { "location": "$home" },
    "filters": [ { "name": "humidity", "op": ">=", "value": "80" } ]
  },
  "action": {
    "kind": "com.twitter",
    "function": "post",
    "inputs": { "status": "@summary" }
  }
}
"#;

pub const CATALOG_JSON: &str = r#"
{
  "devices": [
    {
      "primary_kind": "com.twitter",
      "name": "Twitter",
      "code": "class @com.twitter { action post(in req status: String) #_[canonical=\"tweet\"]; }"
    }
  ]
}
"#;
