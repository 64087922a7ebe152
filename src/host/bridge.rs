//! Host bridge - routes raw host events to the normalizer and throttler
//!
//! [`PortsBridge`] is the synchronous dispatcher a host calls from its event
//! listeners. [`BridgeHandle`] runs the same dispatcher as a tokio task fed
//! through an inbox channel.
//!
//! ```text
//! HostEvent ─► PortsBridge ─┬─ mouse*/touch* ─► PointerNormalizer ─┐
//!                           └─ resize/getsize ─► ResizeThrottler ──┴─► PortSink
//! ```

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::config::PortsConfig;
use crate::error::PortsError;
use crate::geometry::ReferenceElement;
use crate::host::event::{HostEvent, Propagation};
use crate::pointer::PointerNormalizer;
use crate::ports::PortSink;
use crate::resize::{ResizeThrottler, Scheduler, TokioScheduler};

/// Dispatcher wiring one reference element to one sink
pub struct PortsBridge {
    normalizer: PointerNormalizer,
    element: Arc<dyn ReferenceElement>,
    sink: Arc<dyn PortSink>,
    throttler: ResizeThrottler,
}

impl PortsBridge {
    pub fn new(
        config: &PortsConfig,
        element: Arc<dyn ReferenceElement>,
        sink: Arc<dyn PortSink>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        debug!("Creating ports bridge with config: {:?}", config);
        let throttler = ResizeThrottler::new(
            element.clone(),
            sink.clone(),
            scheduler,
            config.throttle_settings(),
        );
        Self {
            normalizer: PointerNormalizer::new(config.coordinate_space),
            element,
            sink,
            throttler,
        }
    }

    pub fn throttler(&self) -> &ResizeThrottler {
        &self.throttler
    }

    /// Handle one host event and tell the host how to treat the native event
    pub fn dispatch(&self, event: &HostEvent) -> Result<Propagation, PortsError> {
        trace!("Dispatching {} event", event.kind());
        let element = self.element.as_ref();

        match event {
            HostEvent::MouseDown(raw) => {
                self.sink.mouse_down(self.normalizer.normalize_mouse(raw, element))?
            }
            HostEvent::MouseMove(raw) => {
                self.sink.mouse_move(self.normalizer.normalize_mouse(raw, element))?
            }
            HostEvent::MouseUp(raw) => {
                self.sink.mouse_up(self.normalizer.normalize_mouse(raw, element))?
            }
            HostEvent::TouchStart(raw) => self
                .sink
                .touch_start(self.normalizer.normalize_touch_batch(raw, element))?,
            HostEvent::TouchMove(raw) => self
                .sink
                .touch_move(self.normalizer.normalize_touch_batch(raw, element))?,
            HostEvent::TouchEnd(raw) => self
                .sink
                .touch_end(self.normalizer.normalize_touch_batch(raw, element))?,
            HostEvent::TouchCancel(raw) => self
                .sink
                .touch_cancel(self.normalizer.normalize_touch_batch(raw, element))?,
            HostEvent::Resize => {
                self.throttler.on_resize_signal();
            }
            HostEvent::GetSize => {
                self.throttler.request_size()?;
            }
        }

        Ok(event.propagation())
    }
}

/// Counters reported when the bridge task ends
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BridgeStats {
    pub events: u64,
    pub failures: u64,
}

/// Handle to a bridge running as a tokio task
///
/// The task runs until every inbox sender is dropped. Propagation decisions
/// are not returned through the inbox; hosts read them from
/// [`HostEvent::propagation`] when they enqueue.
pub struct BridgeHandle {
    inbox: mpsc::Sender<HostEvent>,
    throttler: ResizeThrottler,
    task: JoinHandle<BridgeStats>,
}

impl BridgeHandle {
    /// Spawn a bridge on the current runtime with tokio-backed timers
    pub fn spawn(
        config: PortsConfig,
        element: Arc<dyn ReferenceElement>,
        sink: Arc<dyn PortSink>,
    ) -> Result<Self, PortsError> {
        info!("Spawning ports bridge with config: {:?}", config);

        let scheduler = TokioScheduler::current()?;
        let bridge = PortsBridge::new(&config, element, sink, Arc::new(scheduler));
        let throttler = bridge.throttler().clone();

        let (inbox, receiver) = mpsc::channel(config.channel_capacity);
        debug!(
            "Created bridge inbox with buffer capacity {}",
            config.channel_capacity
        );

        let task = tokio::spawn(run_bridge_loop(bridge, receiver));
        info!("Ports bridge started");

        Ok(Self {
            inbox,
            throttler,
            task,
        })
    }

    /// Sender hosts enqueue raw events on
    pub fn sender(&self) -> mpsc::Sender<HostEvent> {
        self.inbox.clone()
    }

    pub fn throttler(&self) -> &ResizeThrottler {
        &self.throttler
    }

    pub async fn send(&self, event: HostEvent) -> Result<(), PortsError> {
        self.inbox
            .send(event)
            .await
            .map_err(|e| PortsError::Channel(format!("Bridge inbox closed: {}", e)))
    }

    /// Close this handle's inbox sender and wait for the task to drain
    ///
    /// Timers armed before shutdown still fire afterwards.
    pub async fn shutdown(self) -> Result<BridgeStats, PortsError> {
        let Self { inbox, task, .. } = self;
        drop(inbox);
        task.await
            .map_err(|e| PortsError::Task(format!("Bridge task failed: {}", e)))
    }
}

async fn run_bridge_loop(bridge: PortsBridge, mut receiver: mpsc::Receiver<HostEvent>) -> BridgeStats {
    info!("Entering bridge loop");
    let mut stats = BridgeStats::default();

    while let Some(event) = receiver.recv().await {
        stats.events += 1;
        if let Err(e) = bridge.dispatch(&event) {
            warn!("Failed to dispatch {} event: {}", event.kind(), e);
            stats.failures += 1;
        }
    }

    info!(
        "Bridge inbox closed after {} events ({} failed)",
        stats.events, stats.failures
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{ElementLayout, LayoutBox, Size};
    use crate::pointer::{CoordinateSpace, Pointer, PointerFrame, RawMouseEvent, RawTouch, RawTouchEvent};
    use crate::ports::{ChannelSink, Port, PortMessage};
    use crate::resize::ManualScheduler;
    use std::time::Duration;

    fn element() -> Arc<LayoutBox> {
        Arc::new(LayoutBox::new(ElementLayout {
            offset_left: 10.0,
            offset_top: 20.0,
            client_width: 400,
            client_height: 300,
        }))
    }

    #[test]
    fn routes_every_pointer_event_to_its_port() {
        let (sink, mut receiver) = ChannelSink::channel(32);
        let bridge = PortsBridge::new(
            &PortsConfig::default(),
            element(),
            Arc::new(sink),
            Arc::new(ManualScheduler::new()),
        );
        let mouse = RawMouseEvent::at_page(110.0, 220.0);
        let touches = RawTouchEvent::new(vec![RawTouch::at_page(1, 11.0, 21.0)]);

        let events = vec![
            HostEvent::MouseDown(mouse),
            HostEvent::MouseMove(mouse),
            HostEvent::MouseUp(mouse),
            HostEvent::TouchStart(touches.clone()),
            HostEvent::TouchMove(touches.clone()),
            HostEvent::TouchEnd(touches.clone()),
            HostEvent::TouchCancel(touches),
        ];
        for event in &events {
            assert_eq!(bridge.dispatch(event).unwrap(), event.propagation());
        }

        let mut received = Vec::new();
        while let Ok(message) = receiver.try_recv() {
            received.push(message);
        }
        let ports: Vec<Port> = received.iter().map(PortMessage::port).collect();
        assert_eq!(
            ports,
            vec![
                Port::MouseDown,
                Port::MouseMove,
                Port::MouseUp,
                Port::TouchStart,
                Port::TouchMove,
                Port::TouchEnd,
                Port::TouchCancel,
            ]
        );
        assert_eq!(
            received[0].frame(),
            Some(&PointerFrame {
                pointers: vec![Pointer::new("mouse", (100.0, 200.0))],
                ctrl_down: false,
            })
        );
        assert_eq!(
            received[3].frame().map(|f| f.pointers.clone()),
            Some(vec![Pointer::new("1", (1.0, 1.0))])
        );
    }

    #[test]
    fn resize_and_size_requests_go_through_throttler() {
        let (sink, mut receiver) = ChannelSink::channel(32);
        let scheduler = Arc::new(ManualScheduler::new());
        let bridge = PortsBridge::new(
            &PortsConfig::default(),
            element(),
            Arc::new(sink),
            scheduler.clone(),
        );

        assert_eq!(bridge.dispatch(&HostEvent::GetSize).unwrap(), Propagation::NONE);
        for _ in 0..5 {
            bridge.dispatch(&HostEvent::Resize).unwrap();
        }
        assert!(bridge.throttler().is_pending());
        scheduler.advance(Duration::from_millis(33));

        let sizes: Vec<Size> = std::iter::from_fn(|| receiver.try_recv().ok())
            .filter_map(|m| m.size())
            .collect();
        assert_eq!(sizes, vec![Size::new(400, 300), Size::new(400, 300)]);
    }

    #[test]
    fn client_space_config_reaches_normalizer() {
        let (sink, mut receiver) = ChannelSink::channel(4);
        let config = PortsConfig {
            coordinate_space: CoordinateSpace::Client,
            ..PortsConfig::default()
        };
        let bridge = PortsBridge::new(&config, element(), Arc::new(sink), Arc::new(ManualScheduler::new()));

        bridge
            .dispatch(&HostEvent::MouseDown(
                RawMouseEvent::at_page(500.0, 500.0).with_client(5.0, 6.0),
            ))
            .unwrap();

        let message = receiver.try_recv().unwrap();
        assert_eq!(message.frame().unwrap().pointers[0].position, (5.0, 6.0));
    }

    #[test]
    fn closed_sink_surfaces_as_error() {
        let (sink, receiver) = ChannelSink::channel(4);
        drop(receiver);
        let bridge = PortsBridge::new(
            &PortsConfig::default(),
            element(),
            Arc::new(sink),
            Arc::new(ManualScheduler::new()),
        );

        let result = bridge.dispatch(&HostEvent::MouseMove(RawMouseEvent::default()));

        assert!(matches!(result, Err(PortsError::Sink(_))));
    }

    #[tokio::test]
    async fn spawned_bridge_counts_sink_failures_and_keeps_running() {
        let (sink, receiver) = ChannelSink::channel(4);
        drop(receiver);
        let handle = BridgeHandle::spawn(PortsConfig::default(), element(), Arc::new(sink)).unwrap();

        handle.send(HostEvent::MouseMove(RawMouseEvent::default())).await.unwrap();
        handle.send(HostEvent::GetSize).await.unwrap();
        handle.send(HostEvent::Resize).await.unwrap();

        let stats = handle.shutdown().await.unwrap();
        assert_eq!(stats, BridgeStats { events: 3, failures: 2 });
    }

    #[tokio::test(start_paused = true)]
    async fn spawned_bridge_dispatches_in_order_and_drains_on_shutdown() {
        let (sink, mut receiver) = ChannelSink::channel(32);
        let handle = BridgeHandle::spawn(PortsConfig::default(), element(), Arc::new(sink)).unwrap();

        handle
            .send(HostEvent::MouseDown(RawMouseEvent::at_page(10.0, 20.0).with_ctrl(true)))
            .await
            .unwrap();
        for _ in 0..10 {
            handle.send(HostEvent::Resize).await.unwrap();
        }
        // Hosts may enqueue through a cloned inbox sender as well
        handle.sender().send(HostEvent::GetSize).await.unwrap();

        let stats = handle.shutdown().await.unwrap();
        assert_eq!(stats, BridgeStats { events: 12, failures: 0 });

        let first = receiver.recv().await.unwrap();
        assert_eq!(first.port(), Port::MouseDown);
        assert!(first.frame().unwrap().ctrl_down);
        assert_eq!(first.frame().unwrap().pointers[0].position, (0.0, 0.0));

        let requested = receiver.recv().await.unwrap();
        assert_eq!(requested, PortMessage::SizeChanges(Size::new(400, 300)));

        // Throttled emission arrives once the window elapses
        let throttled = receiver.recv().await.unwrap();
        assert_eq!(throttled, PortMessage::SizeChanges(Size::new(400, 300)));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(receiver.try_recv().is_err());
    }
}
