//! Initial values for a new collection.
//!
//! Only used when a [`Collection`](crate::Collection) is constructed, never
//! on save.

use serde_json::{Map, Value, json};

use crate::codec::JsonCollection;
use crate::records::{CardTemplate, Deck, DeckConfig, NoteType, NoteTypeField};

/// Id of the deck and option group every collection starts with.
pub const DEFAULT_DECK_ID: i64 = 1;

/// Default synced collection configuration (`col.conf`).
pub fn default_config() -> JsonCollection<Value> {
    [
        ("activeDecks", json!([DEFAULT_DECK_ID])),
        ("curDeck", json!(DEFAULT_DECK_ID)),
        ("newSpread", json!(0)),
        ("collapseTime", json!(1200)),
        ("timeLim", json!(0)),
        ("estTimes", json!(true)),
        ("dueCounts", json!(true)),
        ("curModel", Value::Null),
        ("nextPos", json!(1)),
        ("sortType", json!("noteFld")),
        ("sortBackwards", json!(false)),
        ("addToCur", json!(true)),
    ]
    .into_iter()
    .collect()
}

/// Default tag cache: empty.
pub fn default_tags() -> Vec<String> {
    Vec::new()
}

/// The "Default" deck.
pub fn default_decks(now: i64) -> JsonCollection<Deck> {
    let deck = new_deck(DEFAULT_DECK_ID, "Default", now);
    [(DEFAULT_DECK_ID.to_string(), deck)].into_iter().collect()
}

/// A normal (non-filtered) deck using the default option group.
pub fn new_deck(id: i64, name: &str, now: i64) -> Deck {
    Deck {
        id,
        name: name.to_string(),
        extra: object(json!({
            "mod": now,
            "usn": -1,
            "lrnToday": [0, 0],
            "revToday": [0, 0],
            "newToday": [0, 0],
            "timeToday": [0, 0],
            "collapsed": false,
            "browserCollapsed": false,
            "desc": "",
            "dyn": 0,
            "conf": DEFAULT_DECK_ID,
            "extendNew": 10,
            "extendRev": 50
        })),
    }
}

/// The "Default" deck option group.
pub fn default_deck_configs() -> JsonCollection<DeckConfig> {
    let config = DeckConfig {
        id: DEFAULT_DECK_ID,
        name: "Default".to_string(),
        extra: object(json!({
            "mod": 0,
            "usn": 0,
            "maxTaken": 60,
            "autoplay": true,
            "timer": 0,
            "replayq": true,
            "new": {
                "bury": true,
                "delays": [1, 10],
                "initialFactor": 2500,
                "ints": [1, 4, 7],
                "order": 1,
                "perDay": 20,
                "separate": true
            },
            "rev": {
                "bury": true,
                "ease4": 1.3,
                "fuzz": 0.05,
                "ivlFct": 1,
                "maxIvl": 36500,
                "perDay": 100,
                "hardFactor": 1.2
            },
            "lapse": {
                "delays": [10],
                "leechAction": 0,
                "leechFails": 8,
                "minInt": 1,
                "mult": 0
            },
            "dyn": false
        })),
    };
    [(DEFAULT_DECK_ID.to_string(), config)].into_iter().collect()
}

/// A "Basic" front/back note type with a single template.
pub fn basic_note_type(id: i64, now: i64) -> NoteType {
    let flds = ["Front", "Back"]
        .iter()
        .enumerate()
        .map(|(i, name)| NoteTypeField {
            name: name.to_string(),
            ord: i as i64,
            extra: object(json!({
                "sticky": false,
                "rtl": false,
                "font": "Arial",
                "size": 20,
                "media": []
            })),
        })
        .collect();

    let tmpls = vec![CardTemplate {
        name: "Card 1".to_string(),
        ord: 0,
        qfmt: "{{Front}}".to_string(),
        afmt: "{{FrontSide}}<hr id=answer>{{Back}}".to_string(),
        extra: object(json!({
            "bqfmt": "",
            "bafmt": "",
            "did": null,
            "bfont": "",
            "bsize": 0
        })),
    }];

    NoteType {
        id,
        name: "Basic".to_string(),
        flds,
        tmpls,
        extra: object(json!({
            "type": 0,
            "mod": now,
            "usn": -1,
            "sortf": 0,
            "did": DEFAULT_DECK_ID,
            "css": ".card {\n    font-family: arial;\n    font-size: 20px;\n    text-align: center;\n    color: black;\n    background-color: white;\n}",
            "latexPre": "\\documentclass[12pt]{article}\n\\special{papersize=3in,5in}\n\\usepackage{amssymb,amsmath}\n\\pagestyle{empty}\n\\setlength{\\parindent}{0in}\n\\begin{document}\n",
            "latexPost": "\\end{document}",
            "latexsvg": false,
            "req": [[0, "any", [0]]]
        })),
    }
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
