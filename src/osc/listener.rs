//! OSC listener — UDP socket listener on a dedicated thread.

use std::io;
use std::net::UdpSocket;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rosc::{decoder, OscPacket};

use super::config::OscConfig;
use super::mapping::{apply_osc_message, OscMapping};
use crate::control::ControlSender;

/// Active OSC listener running on a background thread.
pub struct OscListener {
    stop_flag: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
    port: u16,
}

impl OscListener {
    /// Start listening for OSC messages on a UDP port.
    pub fn start(config: &OscConfig, sender: ControlSender) -> io::Result<Self> {
        let addr = format!("127.0.0.1:{}", config.listen_port);
        let socket = UdpSocket::bind(&addr)?;
        // Short timeout so the stop flag is checked periodically
        socket.set_read_timeout(Some(Duration::from_millis(100)))?;

        let stop_flag = Arc::new(AtomicBool::new(false));
        let stop_clone = stop_flag.clone();
        let mappings = config.mappings.clone();
        let port = config.listen_port;

        let thread = thread::spawn(move || {
            let mut buf = [0u8; 4096];
            while !stop_clone.load(Ordering::Relaxed) {
                match socket.recv_from(&mut buf) {
                    Ok((size, _addr)) => match decoder::decode_udp(&buf[..size]) {
                        Ok((_, packet)) => {
                            if !dispatch(&packet, &mappings, &sender) {
                                // Receiver gone; nobody left to control.
                                break;
                            }
                        }
                        Err(e) => log::debug!("dropping malformed OSC packet: {e}"),
                    },
                    Err(ref e)
                        if e.kind() == io::ErrorKind::WouldBlock
                            || e.kind() == io::ErrorKind::TimedOut =>
                    {
                        continue;
                    }
                    Err(e) => {
                        log::error!("OSC socket error: {e}");
                        break;
                    }
                }
            }
        });

        log::info!("OSC listening on {addr}");
        Ok(Self {
            stop_flag,
            thread: Some(thread),
            port,
        })
    }

    /// Get the listening port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Signal the listener to stop.
    pub fn stop(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for OscListener {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Forward every mapped message in a packet. Returns false once the receiver is gone.
fn dispatch(packet: &OscPacket, mappings: &[OscMapping], sender: &ControlSender) -> bool {
    match packet {
        OscPacket::Message(msg) => match apply_osc_message(msg, mappings) {
            Some(event) => sender.send(event).is_ok(),
            None => {
                log::debug!("unmapped OSC message {}", msg.addr);
                true
            }
        },
        OscPacket::Bundle(bundle) => bundle
            .content
            .iter()
            .all(|content| dispatch(content, mappings, sender)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{control_channel, ControlEvent, GestureUpdate};
    use crate::osc::mapping::OscTarget;
    use rosc::{encoder, OscBundle, OscMessage, OscTime, OscType};

    fn config(port: u16, mappings: Vec<OscMapping>) -> OscConfig {
        OscConfig {
            listen_port: port,
            enabled: true,
            mappings,
        }
    }

    fn send(packet: &OscPacket, port: u16) {
        let encoded = encoder::encode(packet).unwrap();
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        socket.send_to(&encoded, ("127.0.0.1", port)).unwrap();
    }

    #[test]
    fn start_and_stop() {
        let (tx, _rx) = control_channel();
        let mut listener = OscListener::start(&config(19100, Vec::new()), tx).unwrap();
        assert_eq!(listener.port(), 19100);
        listener.stop();
    }

    #[test]
    fn send_and_receive_osc() {
        let (tx, rx) = control_channel();
        let mut listener =
            OscListener::start(&config(19101, OscConfig::default_mappings()), tx).unwrap();

        send(
            &OscPacket::Message(OscMessage {
                addr: "/hands".to_string(),
                args: vec![OscType::Float(0.1), OscType::Float(0.9)],
            }),
            19101,
        );

        let event = rx.poll_timeout(Duration::from_secs(1));
        assert_eq!(
            event,
            Some(ControlEvent::Gesture(GestureUpdate::new(0.1, 0.9)))
        );
        listener.stop();
    }

    #[test]
    fn bundle_contents_forwarded_in_order() {
        let (tx, rx) = control_channel();
        let mappings = vec![
            OscMapping {
                address_pattern: "/play".to_string(),
                target: OscTarget::PlayStop,
            },
            OscMapping {
                address_pattern: "/hands/lost".to_string(),
                target: OscTarget::HandsLost,
            },
        ];
        let mut listener = OscListener::start(&config(19102, mappings), tx).unwrap();

        let bundle = OscPacket::Bundle(OscBundle {
            timetag: OscTime {
                seconds: 0,
                fractional: 1,
            },
            content: vec![
                OscPacket::Message(OscMessage {
                    addr: "/play".to_string(),
                    args: vec![],
                }),
                OscPacket::Message(OscMessage {
                    addr: "/hands/lost".to_string(),
                    args: vec![],
                }),
            ],
        });
        send(&bundle, 19102);

        let timeout = Duration::from_secs(1);
        assert_eq!(rx.poll_timeout(timeout), Some(ControlEvent::StartStop));
        assert_eq!(rx.poll_timeout(timeout), Some(ControlEvent::GestureLost));
        listener.stop();
    }

    #[test]
    fn bind_failure_on_used_port() {
        let (tx1, _rx1) = control_channel();
        let _listener1 = OscListener::start(&config(19103, Vec::new()), tx1).unwrap();

        let (tx2, _rx2) = control_channel();
        assert!(OscListener::start(&config(19103, Vec::new()), tx2).is_err());
    }
}
