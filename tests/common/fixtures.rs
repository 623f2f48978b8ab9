use serde_json::{Value, json};

/// A plain paragraph whose single run starts at document position `src`.
pub fn text_paragraph(id: &str, text: &str, src: usize) -> Value {
    json!({
        "kind": "paragraph",
        "id": id,
        "runs": [{ "kind": "text", "text": text, "srcStart": src }]
    })
}

/// A paragraph that closes a section with the given properties.
pub fn section_paragraph(id: &str, src: usize, properties: Value) -> Value {
    let mut p = text_paragraph(id, id, src);
    p["attrs"] = json!({ "sectionProperties": properties });
    p
}

/// A list paragraph referencing numbering `num_id` at `level`.
pub fn numbered_paragraph(id: &str, src: usize, num_id: i64, level: i64) -> Value {
    let mut p = text_paragraph(id, id, src);
    p["attrs"] = json!({ "numbering": { "numId": num_id, "level": level } });
    p
}

/// Two-level outline: "1." then "1.a.".
pub fn outline_numbering() -> Value {
    json!({
        "numbering": {
            "1": {
                "abstractId": 10,
                "levels": [
                    { "format": "decimal", "text": "%1.", "start": 1,
                      "indent": { "left": 720, "hanging": 360 } },
                    { "format": "lowerLetter", "text": "%1.%2.", "start": 1 }
                ]
            },
            "2": {
                "levels": [
                    { "format": "upperRoman", "text": "%1)", "start": 4, "suffix": "space" }
                ]
            },
            "3": {
                "levels": [
                    { "format": "bullet", "text": "•" }
                ]
            }
        }
    })
}

pub fn heading_styles() -> Value {
    json!({
        "defaults": { "fontFamily": "Body", "fontSize": 20 },
        "styles": {
            "Heading1": {
                "kind": "paragraph",
                "name": "heading 1",
                "paragraph": { "keepNext": true },
                "run": { "size": 32, "bold": true }
            }
        }
    })
}
