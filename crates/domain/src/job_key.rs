use crate::{date::format_timestamp, delivery::DeliveryChannel, shared::entity::ID};

pub const OCCURRENCE_ENTITY: &str = "occurrence";

const JOB_KEY_SEPARATOR: char = '|';

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;
/// Platform notification ids must fit in a positive i32
const NOTIFICATION_ID_MODULUS: u32 = i32::MAX as u32;

/// Identity of one notification attempt
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationJob<'a> {
    pub entity_type: &'a str,
    pub entity_id: &'a ID,
    /// Effective occurrence instant, a snoozed occurrence therefore gets new jobs
    pub occurrence_at: i64,
    pub channel: DeliveryChannel,
}

impl<'a> NotificationJob<'a> {
    pub fn key(&self) -> String {
        build_notification_job_key(self)
    }
}

pub fn build_notification_job_key(job: &NotificationJob) -> String {
    format!(
        "{entity_type}{sep}{entity_id}{sep}{occurrence_at}{sep}{channel}",
        entity_type = job.entity_type,
        entity_id = job.entity_id,
        occurrence_at = format_timestamp(job.occurrence_at),
        channel = job.channel,
        sep = JOB_KEY_SEPARATOR,
    )
}

/// Maps a job key to a stable non-negative integer usable as a platform
/// notification id. 32 bit FNV-1a reduced into the positive i32 range.
pub fn job_key_to_notification_id(key: &str) -> i32 {
    let hash = key.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u32::from(byte)).wrapping_mul(FNV_PRIME)
    });
    (hash % NOTIFICATION_ID_MODULUS) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(entity_id: &ID, channel: DeliveryChannel) -> NotificationJob {
        NotificationJob {
            entity_type: OCCURRENCE_ENTITY,
            entity_id,
            occurrence_at: 1_768_039_200_000,
            channel,
        }
    }

    #[test]
    fn identical_jobs_give_identical_keys() {
        let id = ID::default();
        assert_eq!(
            job(&id, DeliveryChannel::Email).key(),
            job(&id, DeliveryChannel::Email).key()
        );
    }

    #[test]
    fn key_has_fixed_format() {
        let id: ID = "a574624d-7c7f-456c-bbdd-670710302d45".parse().unwrap();
        assert_eq!(
            job(&id, DeliveryChannel::Push).key(),
            "occurrence|a574624d-7c7f-456c-bbdd-670710302d45|2026-01-10T10:00:00.000Z|push"
        );
    }

    #[test]
    fn channel_and_instant_change_the_key() {
        let id = ID::default();
        let email = job(&id, DeliveryChannel::Email).key();
        let push = job(&id, DeliveryChannel::Push).key();
        let fcm = job(&id, DeliveryChannel::Fcm).key();
        assert_ne!(email, push);
        assert_ne!(push, fcm);
        assert_ne!(email, fcm);

        let mut later = job(&id, DeliveryChannel::Email);
        later.occurrence_at += 1;
        assert_ne!(later.key(), email);
    }

    #[test]
    fn notification_id_is_stable_and_non_negative() {
        let id = ID::default();
        for channel in [DeliveryChannel::Email, DeliveryChannel::Push, DeliveryChannel::Fcm] {
            let key = job(&id, channel).key();
            let first = job_key_to_notification_id(&key);
            assert!(first >= 0);
            for _ in 0..10 {
                assert_eq!(job_key_to_notification_id(&key), first);
            }
        }
        assert!(job_key_to_notification_id("") >= 0);
        // Known FNV-1a value of "a" is 0xe40c292c
        assert_eq!(
            job_key_to_notification_id("a"),
            (0xe40c_292c_u32 % (i32::MAX as u32)) as i32
        );
    }
}
