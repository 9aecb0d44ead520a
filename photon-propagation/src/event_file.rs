use crate::{
    deposit::EnergyDeposit,
    photon::{Photon, PhotonCollection},
    summary::RunSummary,
};
use photolib_common::{Channel, Time};
use serde::{Deserialize, Serialize};
use std::{
    collections::{HashMap, HashSet},
    fs::File,
    io::{BufReader, Read},
    path::Path,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventFileError {
    #[error("IO Error: {0}")]
    IO(#[from] std::io::Error),
    #[error("Invalid Event Document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Event {event} has no deposit source labelled \"{label}\"")]
    MissingSource { event: u64, label: String },
    #[error("Event number {0} appears more than once")]
    DuplicateEvent(u64),
}

/// An event number with its deposit collections, in configured label order.
pub type EventSources<'a> = (u64, Vec<&'a [EnergyDeposit]>);

/// Deposits of one event, keyed by source label.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EventInput {
    /// Defaults to the event's position in the file.
    #[serde(default)]
    pub event: Option<u64>,
    pub sources: HashMap<String, Vec<EnergyDeposit>>,
}

impl EventInput {
    /// The deposit collections named by `labels`, in the order of `labels`.
    pub fn select_sources<'a>(
        &'a self,
        event: u64,
        labels: &[String],
    ) -> Result<Vec<&'a [EnergyDeposit]>, EventFileError> {
        labels
            .iter()
            .map(|label| {
                self.sources
                    .get(label)
                    .map(Vec::as_slice)
                    .ok_or_else(|| EventFileError::MissingSource {
                        event,
                        label: label.clone(),
                    })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EventFile {
    pub events: Vec<EventInput>,
}

impl EventFile {
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, EventFileError> {
        Self::from_reader(BufReader::new(File::open(path.as_ref())?))
    }

    /// Parses an event document. Event numbers must be unique, as each one
    /// seeds its own streams in a parallel run.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, EventFileError> {
        let file: Self = serde_json::from_reader(reader)?;
        let mut seen = HashSet::new();
        if let Some((event, _)) = file.numbered().find(|(event, _)| !seen.insert(*event)) {
            return Err(EventFileError::DuplicateEvent(event));
        }
        Ok(file)
    }

    /// The sources named by `labels` for every event, in file order.
    pub fn select_sources(&self, labels: &[String]) -> Result<Vec<EventSources<'_>>, EventFileError> {
        self.numbered()
            .map(|(event, input)| Ok((event, input.select_sources(event, labels)?)))
            .collect()
    }

    /// Event numbers paired with their inputs.
    pub fn numbered(&self) -> impl Iterator<Item = (u64, &EventInput)> {
        self.events
            .iter()
            .enumerate()
            .map(|(index, input)| (input.event.unwrap_or(index as u64), input))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ChannelOutput {
    pub channel: Channel,
    pub num_photons: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_time: Option<Time>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photons: Option<Vec<Photon>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct EventOutput {
    pub event: u64,
    pub total_photons: usize,
    pub channels: Vec<ChannelOutput>,
}

impl EventOutput {
    pub fn new(event: u64, collection: PhotonCollection, full_photons: bool) -> Self {
        let channels = collection
            .into_iter()
            .map(|channel| ChannelOutput {
                channel: channel.channel,
                num_photons: channel.len(),
                first_time: channel.photons.iter().map(|p| p.time).reduce(Time::min),
                photons: full_photons.then_some(channel.photons),
            })
            .collect::<Vec<_>>();
        Self {
            event,
            total_photons: channels.iter().map(|c| c.num_photons).sum(),
            channels,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RunOutput {
    pub summary: RunSummary,
    pub events: Vec<EventOutput>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{deposit::Position, photon::ChannelPhotons};

    const JSON_INPUT_1: &str = r#"
    {
        "events": [
            {
                "sources": {
                    "ionization": [
                        { "position": { "x": 1, "y": 2, "z": 3 }, "time": 5.0, "energy": 1.5, "pdg-code": 13, "track-id": 4 }
                    ],
                    "cosmics": []
                }
            },
            {
                "event": 17,
                "sources": { "ionization": [] }
            }
        ]
    }
    "#;

    #[test]
    fn parse_and_select() {
        let file = EventFile::from_reader(JSON_INPUT_1.as_bytes()).expect("valid document");
        let numbered = file.numbered().collect::<Vec<_>>();
        assert_eq!(numbered.len(), 2);
        let (first_number, first) = numbered.first().copied().expect("two events");
        assert_eq!(first_number, 0);

        let labels = vec!["cosmics".to_owned(), "ionization".to_owned()];
        let sources = first.select_sources(first_number, &labels).expect("both present");
        assert_eq!(sources.len(), 2);
        assert!(sources.first().is_some_and(|s| s.is_empty()));
        let deposit = sources.get(1).and_then(|s| s.first()).expect("one deposit");
        assert_eq!(deposit.position, Position::new(1.0, 2.0, 3.0));
        assert_eq!(deposit.pdg_code, 13);
        assert_eq!(deposit.track_id, 4);

        let (second_number, second) = numbered.get(1).copied().expect("two events");
        assert_eq!(second_number, 17);
        let error = second
            .select_sources(second_number, &labels)
            .expect_err("cosmics missing");
        assert_eq!(
            error.to_string(),
            "Event 17 has no deposit source labelled \"cosmics\""
        );
    }

    #[test]
    fn select_all_events() {
        let file = EventFile::from_reader(JSON_INPUT_1.as_bytes()).expect("valid document");
        let selected = file
            .select_sources(&["ionization".to_owned()])
            .expect("every event has ionization");
        let numbers = selected.iter().map(|(event, _)| *event).collect::<Vec<_>>();
        assert_eq!(numbers, vec![0, 17]);
        assert!(file.select_sources(&["cosmics".to_owned()]).is_err());
    }

    #[test]
    fn duplicate_event_numbers() {
        // The second event takes its position, 1, as its number
        let document = r#"
        {
            "events": [
                { "event": 1, "sources": {} },
                { "sources": {} }
            ]
        }
        "#;
        let result = EventFile::from_reader(document.as_bytes());
        assert!(matches!(result, Err(EventFileError::DuplicateEvent(1))));
    }

    #[test]
    fn event_output_counts() {
        let photon = |time| Photon {
            time,
            position: Position::default(),
            energy: 1.0,
            in_sensitive_volume: false,
        };
        let collection = vec![
            ChannelPhotons {
                channel: 0,
                photons: vec![photon(4.0), photon(2.0), photon(9.0)],
            },
            ChannelPhotons::new(1),
        ];
        let output = EventOutput::new(3, collection, false);
        assert_eq!(output.total_photons, 3);
        let channel0 = output.channels.first().expect("two channels");
        assert_eq!(channel0.first_time, Some(2.0));
        assert!(channel0.photons.is_none());
        let channel1 = output.channels.get(1).expect("two channels");
        assert_eq!(channel1.first_time, None);

        let json = serde_json::to_value(&output).expect("serialisable");
        assert_eq!(json["channels"][0]["num-photons"], 3);
        assert!(json["channels"][1].get("first-time").is_none());
    }
}
