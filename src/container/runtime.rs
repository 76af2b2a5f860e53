/// Fragments of error text produced when the container engine cannot be
/// reached at all. The first three come from the Docker CLI and daemon, the rest
/// from the client library used here. Matching is case-insensitive.
const UNAVAILABLE_MARKERS: &[&str] = &[
    "Cannot connect to the Docker daemon",
    "error during connect",
    "Is the docker daemon running",
    "failed to initialize a docker client",
    "Socket not found",
    "error trying to connect",
    "client error (Connect)",
];

pub(crate) fn is_unavailable(message: &str) -> bool {
    let message = message.to_lowercase();

    UNAVAILABLE_MARKERS
        .iter()
        .any(|marker| message.contains(&marker.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_docker_daemon_messages() {
        assert!(is_unavailable(
            "Cannot connect to the Docker daemon at unix:///var/run/docker.sock. Is the docker daemon running?"
        ));
        assert!(is_unavailable(
            "error during connect: Get \"http://%2F%2F.%2Fpipe%2Fdocker_engine/v1.24/version\""
        ));
    }

    #[test]
    fn recognizes_client_messages() {
        assert!(is_unavailable(
            "failed to initialize a docker client: Socket not found: /var/run/docker.sock"
        ));
        assert!(is_unavailable(
            "Error in the hyper legacy client: client error (Connect)"
        ));
    }

    #[test]
    fn ignores_case() {
        assert!(is_unavailable("CANNOT CONNECT TO THE DOCKER DAEMON"));
    }

    #[test]
    fn other_failures_are_not_unavailability() {
        assert!(!is_unavailable("No such image: postgres:99-alpine"));
        assert!(!is_unavailable("port is already allocated"));
        assert!(!is_unavailable(""));
    }
}
