#![cfg(target_os = "linux")]
#![cfg(feature = "tokio-support")]

use afpacket::{AsyncBoundSocket, ETH_P_PAE};
use eapol_packets as packets;
use std::{ffi::CString, time::Duration};
use tokio::time;

// Needs CAP_NET_RAW, see afpacket_tests.rs.

#[tokio::test]
#[ignore]
async fn layer2_loopback() {
    // If this takes more than a second to occur, something's definitely wrong.
    let timeout = Duration::from_secs(1);
    let iface_name = CString::new("lo").unwrap();

    let side_a = AsyncBoundSocket::from_interface(&iface_name, ETH_P_PAE).unwrap();
    let side_b = AsyncBoundSocket::from_interface(&iface_name, ETH_P_PAE).unwrap();
    side_b.set_promiscuous(true).unwrap();

    let mut eth_pkt = packets::EthernetFrame::encap_eapol(packets::EapolFrame::start(2));
    eth_pkt.set_src_mac(packets::MacAddr::new([0x02, 0, 0, 0, 0, 0x02]));
    eth_pkt.set_dest_mac(packets::PAE_GROUP_ADDR);

    let receiver = tokio::spawn(async move {
        let mut in_buffer = vec![0; 1500];
        let (len, _) = side_b.recv(&mut in_buffer).await.unwrap();
        in_buffer.truncate(len);
        side_b.set_promiscuous(false).unwrap();
        in_buffer
    });

    side_a.send(&eth_pkt.data).await.unwrap();

    let in_buffer = time::timeout(timeout, receiver).await.unwrap().unwrap();
    assert_eq!(in_buffer, eth_pkt.data);
}
