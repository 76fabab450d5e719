use crate::binding::{Binding, MTU};
use crate::classify::classify;
use crate::shutdown::Shutdown;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tracing::{error, info, trace};

/// How long a loop waits after a failed read before reading again.
pub const READ_BACKOFF: Duration = Duration::from_millis(500);

/// Bytes read from a binding, together with the name of the interface they came from.
#[derive(Clone, Copy, Debug)]
pub struct RawFrame<'a> {
    pub data: &'a [u8],
    pub iface: &'a str,
}

/// What happened during one iteration of a forwarding loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Forwarded,
    Ignored,
    ReadFault,
    WriteFault,
}

/// Per-direction counters, handed back when the loop stops.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub frames_forwarded: u64,
    pub frames_ignored: u64,
    pub read_errors: u64,
    pub write_errors: u64,
}

/// Moves EAPOL frames in one direction, from `src` to `dst`.
pub struct ForwardingLoop<B: Binding> {
    src: Arc<B>,
    dst: Arc<B>,
    buf: Vec<u8>,
    stats: LoopStats,
}

impl<B: Binding> ForwardingLoop<B> {
    pub fn new(src: Arc<B>, dst: Arc<B>) -> Self {
        ForwardingLoop {
            src,
            dst,
            buf: vec![0; MTU],
            stats: LoopStats::default(),
        }
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    /// Reads one frame and forwards it if it is EAPOL. Faults are logged and reported through
    /// the outcome, never returned.
    pub async fn step(&mut self) -> Outcome {
        let (len, link_src) = match self.src.recv(&mut self.buf).await {
            Ok(received) => received,
            Err(err) => {
                self.stats.read_errors += 1;
                error!("{}: unexpected read error: {}", self.src.name(), err);
                return Outcome::ReadFault;
            }
        };
        let frame = RawFrame {
            data: &self.buf[..len],
            iface: self.src.name(),
        };

        let classified = match classify(frame.data) {
            Some(classified) => classified,
            None => {
                self.stats.frames_ignored += 1;
                trace!(
                    "{}: ignoring {} byte frame from {}, not EAPOL",
                    frame.iface,
                    len,
                    link_src
                );
                return Outcome::Ignored;
            }
        };
        info!("{}", classified.summary(frame.iface, self.dst.name()));

        match self.dst.send(frame.data).await {
            Ok(_) => {
                self.stats.frames_forwarded += 1;
                Outcome::Forwarded
            }
            Err(err) => {
                self.stats.write_errors += 1;
                error!("{}: unexpected write error: {}", self.dst.name(), err);
                Outcome::WriteFault
            }
        }
    }

    /// Forwards frames until `shutdown` fires. Read faults are retried after `READ_BACKOFF`,
    /// forever; write faults drop the frame and move on.
    pub async fn run(mut self, mut shutdown: Shutdown) -> LoopStats {
        loop {
            let outcome = tokio::select! {
                _ = shutdown.wait() => break,
                outcome = self.step() => outcome,
            };
            if outcome == Outcome::ReadFault {
                tokio::select! {
                    _ = shutdown.wait() => break,
                    _ = time::sleep(READ_BACKOFF) => {}
                }
            }
        }
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shutdown;
    use crate::utils::test::fake_binding::{FakeBinding, FakeWire};
    use crate::utils::test::logs::capture_logs;
    use crate::utils::test::packet_generators::{
        eap_request_identity, ipv4_frame, random_eap_response,
    };
    use eapol_packets::{MacAddr, PAE_GROUP_ADDR};

    const ONT: MacAddr = MacAddr {
        bytes: [0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa],
    };
    const ROUTER: MacAddr = MacAddr {
        bytes: [0xac, 0x67, 0x3d, 0xfa, 0xbc, 0xdd],
    };

    fn wan_to_router() -> (ForwardingLoop<FakeBinding>, FakeWire, FakeWire) {
        let (wan, wan_wire) = FakeBinding::new("wan");
        let (router, router_wire) = FakeBinding::new("router");
        (
            ForwardingLoop::new(Arc::new(wan), Arc::new(router)),
            wan_wire,
            router_wire,
        )
    }

    #[tokio::test]
    async fn forwards_eapol_unchanged() {
        let (logs, _guard) = capture_logs();
        let (mut relay, wan, router) = wan_to_router();
        let frame = eap_request_identity(ONT, 10);

        wan.inject(frame.clone());
        assert_eq!(relay.step().await, Outcome::Forwarded);

        assert_eq!(router.written(), vec![frame]);
        assert!(wan.written().is_empty());
        assert_eq!(
            logs.lines(),
            vec![
                "wan: aa:aa:aa:aa:aa:aa > 01:80:c2:00:00:03, EAP-Packet v1, len 5, Request (1) id 10 > router"
            ]
        );
        assert_eq!(relay.stats().frames_forwarded, 1);
    }

    #[tokio::test]
    async fn drops_non_eapol_silently() {
        let (logs, _guard) = capture_logs();
        let (mut relay, wan, router) = wan_to_router();

        wan.inject(ipv4_frame(ONT, ROUTER));
        wan.inject(vec![0x01, 0x02, 0x03]);
        assert_eq!(relay.step().await, Outcome::Ignored);
        assert_eq!(relay.step().await, Outcome::Ignored);

        assert!(router.written().is_empty());
        assert!(logs.lines().is_empty());
        assert_eq!(relay.stats().frames_ignored, 2);
    }

    #[tokio::test]
    async fn random_eapol_round_trips() {
        let mut rng = rand::thread_rng();
        let (mut relay, wan, router) = wan_to_router();

        for _ in 0..32 {
            let frame = random_eap_response(&mut rng, ROUTER);
            wan.inject(frame.clone());
            assert_eq!(relay.step().await, Outcome::Forwarded);
            assert_eq!(router.written(), vec![frame]);
        }
    }

    #[tokio::test]
    async fn oversized_frames_are_truncated_to_mtu() {
        let (mut relay, wan, router) = wan_to_router();
        let mut frame = eap_request_identity(ONT, 1);
        frame.resize(MTU + 100, 0xee);

        wan.inject(frame.clone());
        assert_eq!(relay.step().await, Outcome::Forwarded);
        assert_eq!(router.written(), vec![frame[..MTU].to_vec()]);
    }

    #[tokio::test]
    async fn write_fault_is_logged_and_skipped() {
        let (logs, _guard) = capture_logs();
        let (mut relay, wan, router) = wan_to_router();
        let first = eap_request_identity(ONT, 1);
        let second = eap_request_identity(ONT, 2);

        router.fail_writes(1);
        wan.inject(first);
        wan.inject(second.clone());
        assert_eq!(relay.step().await, Outcome::WriteFault);
        assert_eq!(relay.step().await, Outcome::Forwarded);

        assert_eq!(router.written(), vec![second]);
        assert_eq!(
            logs.count_containing("router: unexpected write error: injected write fault"),
            1
        );
        let stats = relay.stats();
        assert_eq!(stats.write_errors, 1);
        assert_eq!(stats.frames_forwarded, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn read_faults_back_off_and_recover() {
        const FAULTS: u32 = 4;
        let (logs, _guard) = capture_logs();
        let (relay, wan, router) = wan_to_router();
        let (trigger, shutdown) = shutdown::channel();

        for _ in 0..FAULTS {
            wan.inject_read_fault();
        }
        let frame = eap_request_identity(ONT, 7);
        wan.inject(frame.clone());

        let started = time::Instant::now();
        let task = tokio::spawn(relay.run(shutdown));

        let forwarded = router.next_written(Duration::from_secs(10)).await;
        let elapsed = started.elapsed();
        assert_eq!(forwarded, Some(frame));
        assert!(elapsed >= READ_BACKOFF * FAULTS, "resumed after {:?}", elapsed);
        assert!(elapsed < READ_BACKOFF * (FAULTS + 1), "resumed after {:?}", elapsed);
        assert_eq!(
            logs.count_containing("wan: unexpected read error: injected read fault"),
            FAULTS as usize
        );

        assert!(!task.is_finished());
        trigger.fire();
        let stats = task.await.unwrap();
        assert_eq!(stats.read_errors, u64::from(FAULTS));
        assert_eq!(stats.frames_forwarded, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_interrupts_backoff() {
        let (relay, wan, _router) = wan_to_router();
        let (trigger, shutdown) = shutdown::channel();

        wan.inject_read_fault();
        let task = tokio::spawn(relay.run(shutdown));
        while wan.reads() == 0 {
            tokio::task::yield_now().await;
        }

        let started = time::Instant::now();
        trigger.fire();
        let stats = task.await.unwrap();
        assert!(started.elapsed() < READ_BACKOFF);
        assert_eq!(stats.read_errors, 1);
    }

    #[tokio::test]
    async fn shutdown_interrupts_idle_read() {
        let (relay, _wan, _router) = wan_to_router();
        let (trigger, shutdown) = shutdown::channel();

        let task = tokio::spawn(relay.run(shutdown));
        tokio::task::yield_now().await;
        trigger.fire();

        let stats = time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stats, LoopStats::default());
    }

    #[tokio::test]
    async fn pae_group_frames_keep_their_addresses() {
        let (mut relay, wan, router) = wan_to_router();
        wan.inject(eap_request_identity(ROUTER, 3));
        relay.step().await;

        let written = router.written();
        assert_eq!(&written[0][0..6], &PAE_GROUP_ADDR.bytes);
        assert_eq!(&written[0][6..12], &ROUTER.bytes);
    }
}
