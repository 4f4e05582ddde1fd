use uuid::Uuid;

pub type JobId = Uuid;
/// Handle of a message in the conversation that status text is relayed to.
pub type MessageId = i64;

/// Compose the outbound stream URL from the ingest base URL and the secret stream key.
///
/// The result is handed to the transcoder as-is and never parsed.
pub fn destination(base_url: &str, stream_key: &str) -> String {
    format!("{}{}", base_url, stream_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_is_plain_concatenation() {
        assert_eq!(
            destination("rtmps://dc1-1.rtmp.t.me/s/", "123:abc"),
            "rtmps://dc1-1.rtmp.t.me/s/123:abc"
        );
    }
}
