//! Campaign payload for one city.
//!
//! Three chained actions: send the city's email template, then its SMS
//! template, then a webhook to the WhatsApp gateway. The canvas block only
//! positions nodes in Mautic's builder and is emitted as fixed data.

use serde_json::{Value, json};

use crate::record::RecordId;

/// Everything a campaign needs, already resolved to ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignPlan {
    pub city: String,
    pub segment: RecordId,
    pub email: RecordId,
    pub sms: RecordId,
    pub webhook_url: String,
}

/// Mautic wants numeric ids where it can get them.
fn id_value(id: &RecordId) -> Value {
    id.as_str()
        .parse::<i64>()
        .map_or_else(|_| Value::String(id.to_string()), Value::from)
}

fn action(id: &str, name: &str, kind: &str, order: u8, properties: Value, parent: Option<&str>) -> Value {
    json!({
        "id": id,
        "name": name,
        "type": kind,
        "eventType": "action",
        "order": order,
        "properties": properties,
        "triggerDate": null,
        "triggerInterval": 1,
        "triggerIntervalUnit": "d",
        "triggerHour": null,
        "triggerRestrictedStartHour": null,
        "triggerRestrictedStopHour": null,
        "triggerRestrictedDaysOfWeek": [],
        "triggerMode": "immediate",
        "decisionPath": parent.map(|_| "yes"),
        "parent": parent.map(|p| json!({"id": p})),
    })
}

fn canvas(x: &str, y: &str) -> Value {
    json!({"droppedX": x, "droppedY": y})
}

impl CampaignPlan {
    pub fn name(&self) -> String {
        format!("Campaña - {}", self.city)
    }

    pub fn payload(&self) -> Value {
        let city = &self.city;

        let email = action(
            "new1",
            &format!("Enviar Email - {city}"),
            "email.send",
            1,
            json!({"canvasSettings": canvas("520", "155"), "email": id_value(&self.email)}),
            None,
        );
        let sms = action(
            "new2",
            &format!("Enviar SMS - {city}"),
            "sms.send_text_sms",
            2,
            json!({"canvasSettings": canvas("710", "291"), "sms": id_value(&self.sms)}),
            Some("new1"),
        );
        let webhook = action(
            "new3",
            "Enviar texto simple",
            "campaign.sendwebhook",
            3,
            json!({
                "canvasSettings": canvas("910", "401"),
                "url": self.webhook_url,
                "method": "post",
                "additional_data": {"list": [
                    {"label": "chatId", "value": "{contactfield=mobilewithoutplus}@c.us"},
                    {"label": "reply_to", "value": "null"},
                    {"label": "text", "value": "Hola {contactfield=firstname}, el clima.."},
                    {"label": "linkPreview", "value": "true"},
                    {"label": "session", "value": "default"},
                ]},
                "headers": {"list": [
                    {"label": "content-type", "value": "application/json"},
                ]},
            }),
            Some("new2"),
        );

        json!({
            "name": self.name(),
            "description": format!("Campaña para {city}"),
            "isPublished": true,
            "publishUp": null,
            "publishDown": null,
            "lists": [{"id": id_value(&self.segment)}],
            "events": [email, sms, webhook],
            "canvasSettings": {
                "nodes": [
                    {"id": "new1", "positionX": "810", "positionY": "186"},
                    {"id": "new2", "positionX": "710", "positionY": "291"},
                    {"id": "new3", "positionX": "910", "positionY": "401"},
                    {"id": "lists", "positionX": "833", "positionY": "50"},
                ],
                "connections": [
                    {"sourceId": "lists", "targetId": "new1", "anchors": {"source": "leadsource", "target": "top"}},
                    {"sourceId": "new1", "targetId": "new2", "anchors": {"source": "bottom", "target": "top"}},
                    {"sourceId": "new2", "targetId": "new3", "anchors": {"source": "bottom", "target": "top"}},
                ],
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn plan() -> CampaignPlan {
        CampaignPlan {
            city: "Lima".into(),
            segment: RecordId::new("4"),
            email: RecordId::new("10"),
            sms: RecordId::new("abc"),
            webhook_url: "http://waha:3000/api/sendText".into(),
        }
    }

    #[test]
    fn header_fields() {
        let p = plan().payload();
        assert_eq!(p["name"], json!("Campaña - Lima"));
        assert_eq!(p["description"], json!("Campaña para Lima"));
        assert_eq!(p["isPublished"], json!(true));
        assert_eq!(p["lists"], json!([{"id": 4}]));
    }

    #[test]
    fn events_chain_email_sms_webhook() {
        let p = plan().payload();
        let events = p["events"].as_array().cloned().unwrap_or_default();
        let kinds: Vec<&str> = events.iter().filter_map(|e| e["type"].as_str()).collect();
        assert_eq!(kinds, vec!["email.send", "sms.send_text_sms", "campaign.sendwebhook"]);

        assert_eq!(events[0]["properties"]["email"], json!(10));
        assert_eq!(events[0]["parent"], Value::Null);
        assert_eq!(events[0]["decisionPath"], Value::Null);

        assert_eq!(events[1]["properties"]["sms"], json!("abc"));
        assert_eq!(events[1]["parent"], json!({"id": "new1"}));
        assert_eq!(events[1]["decisionPath"], json!("yes"));

        assert_eq!(events[2]["properties"]["url"], json!("http://waha:3000/api/sendText"));
        assert_eq!(events[2]["parent"], json!({"id": "new2"}));
    }

    #[test]
    fn canvas_is_fixed() {
        let p = plan().payload();
        assert_eq!(p["canvasSettings"]["nodes"].as_array().map(Vec::len), Some(4));
        assert_eq!(p["canvasSettings"]["connections"][0]["sourceId"], json!("lists"));
    }
}
