// Copyright Claudio Mattera 2025.
//
// Distributed under the MIT License or the Apache 2.0 License at your option.
// See the accompanying files LICENSE-MIT.txt and LICENSE-APACHE-2.0.txt, or
// online at
// https://opensource.org/licenses/MIT
// https://opensource.org/licenses/Apache-2.0

//! Functions, tasks and transport for a WiFi connection that can be paused

use log::debug;
use log::error;
use log::info;
use log::warn;

use embassy_executor::Spawner;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use embassy_futures::select::select;
use embassy_futures::select::Either;

use esp_wifi::init as initialize_wifi;
use esp_wifi::wifi::new_with_mode as new_wifi_with_mode;
use esp_wifi::wifi::ClientConfiguration;
use esp_wifi::wifi::Configuration;
use esp_wifi::wifi::WifiController;
use esp_wifi::wifi::WifiDevice;
use esp_wifi::wifi::WifiError as EspWifiError;
use esp_wifi::wifi::WifiEvent;
use esp_wifi::wifi::WifiStaDevice;
use esp_wifi::EspWifiController;
use esp_wifi::InitializationError as WifiInitializationError;

use embassy_net::new as new_network_stack;
use embassy_net::udp::PacketMetadata;
use embassy_net::udp::UdpSocket;
use embassy_net::Config;
use embassy_net::DhcpConfig;
use embassy_net::IpAddress;
use embassy_net::Runner;
use embassy_net::Stack;
use embassy_net::StackResources;

use embassy_time::Duration;
use embassy_time::Timer;

use esp_hal::peripherals::RADIO_CLK;
use esp_hal::peripherals::TIMG0;
use esp_hal::peripherals::WIFI;
use esp_hal::rng::Rng;
use esp_hal::timer::timg::TimerGroup;
use esp_hal::Blocking;

use heapless::String;

use static_cell::StaticCell;

use snooze_rs::AsyncTransport;

/// UDP port for heartbeats, on both node and gateway
const HEARTBEAT_PORT: u16 = 5683;

/// Payload of a heartbeat
const HEARTBEAT: &[u8] = b"snooze";

/// Pause between failed connection attempts
const RETRY_DELAY: Duration = Duration::from_millis(5000);

/// Static cell for network stack resources
static STACK_RESOURCES: StaticCell<StackResources<3>> = StaticCell::new();

/// Static cell for WiFi controller
static WIFI_CONTROLLER: StaticCell<EspWifiController<'static>> = StaticCell::new();

/// Signal to request to stop WiFi
static STOP_WIFI_SIGNAL: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Signal that WiFi was stopped
static WIFI_STOPPED_SIGNAL: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Signal to request to start WiFi again
static START_WIFI_SIGNAL: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Initialize WiFi and spawn the connection tasks
///
/// The connection is established in background, use
/// [`WifiTransport::is_ready()`] to check it.
pub fn start(
    spawner: Spawner,
    timg0: TimerGroup<'static, TIMG0, Blocking>,
    mut rng: Rng,
    wifi: WIFI,
    radio_clock_control: RADIO_CLK,
    (ssid, password): (String<32>, String<64>),
) -> Result<WifiTransport, Error> {
    let seed = (u64::from(rng.random()) << 32) | u64::from(rng.random());
    debug!("Use random seed 0x{seed:016x}");

    let wifi_controller = initialize_wifi(timg0.timer0, rng, radio_clock_control)?;
    let wifi_controller: &'static mut _ = WIFI_CONTROLLER.init(wifi_controller);

    let (wifi_interface, controller) = new_wifi_with_mode(wifi_controller, wifi, WifiStaDevice)?;

    let config = Config::dhcpv4(DhcpConfig::default());

    debug!("Initialize network stack");
    let stack_resources: &'static mut _ = STACK_RESOURCES.init(StackResources::new());
    let (stack, runner) = new_network_stack(wifi_interface, config, stack_resources, seed);

    spawner.must_spawn(connection(controller, ssid, password));
    spawner.must_spawn(net_task(runner));

    Ok(WifiTransport {
        stack,
        enabled: true,
    })
}

/// Task for ongoing network processing
#[embassy_executor::task]
async fn net_task(mut runner: Runner<'static, WifiDevice<'static, WifiStaDevice>>) {
    runner.run().await;
}

/// Task for WiFi connection
///
/// This will run [`connection_fallible()`] forever, and retry after any
/// error.
#[embassy_executor::task]
async fn connection(
    mut controller: WifiController<'static>,
    ssid: String<32>,
    password: String<64>,
) {
    debug!("Device capabilities: {:?}", controller.capabilities());

    let client_config = Configuration::Client(ClientConfiguration {
        ssid,
        password,
        ..Default::default()
    });
    if let Err(error) = controller.set_configuration(&client_config) {
        error!("Cannot configure WiFi: {error:?}");
        return;
    }

    loop {
        if let Err(error) = connection_fallible(&mut controller).await {
            error!("WiFi connection failed: {error:?}");
            Timer::after(RETRY_DELAY).await;
        }
    }
}

/// Fallible step of WiFi connection
///
/// Connect, and stay connected until asked to stop or until disconnected.
async fn connection_fallible(controller: &mut WifiController<'static>) -> Result<(), Error> {
    if !matches!(controller.is_started(), Ok(true)) {
        debug!("Starting WiFi controller");
        controller.start_async().await?;
    }

    debug!("Connect to WiFi network");
    match select(STOP_WIFI_SIGNAL.wait(), controller.connect_async()).await {
        Either::First(()) => return stop_until_started(controller).await,
        Either::Second(result) => result?,
    }
    info!("Connected to WiFi network");

    let disconnected = controller.wait_for_event(WifiEvent::StaDisconnected);
    match select(STOP_WIFI_SIGNAL.wait(), disconnected).await {
        Either::First(()) => stop_until_started(controller).await,
        Either::Second(()) => {
            warn!("Disconnected from WiFi network");
            Timer::after(RETRY_DELAY).await;
            Ok(())
        }
    }
}

/// Stop WiFi, and wait until asked to start it again
///
/// [`WIFI_STOPPED_SIGNAL`] is signalled even if stopping fails.
async fn stop_until_started(controller: &mut WifiController<'static>) -> Result<(), Error> {
    info!("Received signal to stop wifi");
    let result = controller.stop_async().await;
    WIFI_STOPPED_SIGNAL.signal(());

    START_WIFI_SIGNAL.wait().await;
    info!("Received signal to start wifi");

    result.map_err(Error::from)
}

/// A WiFi transport to a gateway
pub struct WifiTransport {
    /// Network stack
    stack: Stack<'static>,

    /// Whether WiFi was requested to be on
    enabled: bool,
}

impl WifiTransport {
    /// Send a heartbeat to the gateway
    async fn send_heartbeat_fallible(&mut self) -> Result<(), Error> {
        let gateway = self
            .stack
            .config_v4()
            .and_then(|config| config.gateway)
            .ok_or(Error::MissingGateway)?;

        let mut rx_meta = [PacketMetadata::EMPTY; 1];
        let mut rx_buffer = [0; 64];
        let mut tx_meta = [PacketMetadata::EMPTY; 1];
        let mut tx_buffer = [0; 64];
        let mut socket = UdpSocket::new(
            self.stack,
            &mut rx_meta,
            &mut rx_buffer,
            &mut tx_meta,
            &mut tx_buffer,
        );
        socket.bind(HEARTBEAT_PORT).map_err(|_error| Error::Udp)?;

        debug!("Send heartbeat to {gateway}");
        socket
            .send_to(HEARTBEAT, (IpAddress::Ipv4(gateway), HEARTBEAT_PORT))
            .await
            .map_err(|_error| Error::Udp)?;
        socket.flush().await;

        Ok(())
    }
}

impl AsyncTransport for WifiTransport {
    async fn is_ready(&mut self) -> bool {
        if !self.enabled {
            debug!("Request to start wifi");
            START_WIFI_SIGNAL.signal(());
            self.enabled = true;
        }
        self.stack.is_link_up() && self.stack.config_v4().is_some()
    }

    async fn send_heartbeat(&mut self) {
        if let Err(error) = self.send_heartbeat_fallible().await {
            warn!("Cannot send heartbeat: {error:?}");
        }
    }

    async fn disable(&mut self) {
        if self.enabled {
            debug!("Request to stop wifi");
            STOP_WIFI_SIGNAL.signal(());
            WIFI_STOPPED_SIGNAL.wait().await;
            self.enabled = false;
        }
    }
}

/// Error within WiFi connection
#[derive(Debug)]
pub enum Error {
    /// Error during WiFi initialization
    WifiInitialization(#[expect(unused, reason = "Never read directly")] WifiInitializationError),

    /// Error during WiFi operation
    Wifi(#[expect(unused, reason = "Never read directly")] EspWifiError),

    /// DHCP did not provide a gateway
    MissingGateway,

    /// Error while binding or sending on a UDP socket
    Udp,
}

impl From<WifiInitializationError> for Error {
    fn from(error: WifiInitializationError) -> Self {
        Self::WifiInitialization(error)
    }
}

impl From<EspWifiError> for Error {
    fn from(error: EspWifiError) -> Self {
        Self::Wifi(error)
    }
}
