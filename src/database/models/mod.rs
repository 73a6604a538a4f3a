pub mod application;
pub mod message;
pub mod notification;
pub mod preference;
pub mod profile;
pub mod skill;
pub mod user;

pub use application::{apply_status, job_key, Applicant, AppliedJob, StatusChange};
pub use message::{Message, NewMessage};
pub use notification::Notification;
pub use preference::{NewPreference, Preference, PreferenceField, PreferenceUpdate};
pub use profile::{Attachment, NewAttachment, Portfolio, PortfolioLinks};
pub use skill::{NewSkill, Skill, SkillChanges};
pub use user::{NewUser, PeerInfo, User, UserRegistration, UserUpdate};

/// Request bodies carry ids as either `5` or `"5"`.
pub(crate) mod numeric_id {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    fn parse<E: serde::de::Error>(raw: Raw) -> Result<i64, E> {
        match raw {
            Raw::Number(n) => Ok(n),
            Raw::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("'{}' is not an integer id", s))),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        parse(Raw::deserialize(deserializer)?)
    }

    pub mod option {
        use super::{parse, Raw};
        use serde::{Deserialize, Deserializer};

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
            Option::<Raw>::deserialize(deserializer)?.map(parse).transpose()
        }
    }
}
