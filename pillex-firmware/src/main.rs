//! Pillex - Automatic Pill Dispenser Firmware
//!
//! Main firmware binary for RP2040-based pill dispensers. The host
//! schedules doses over the serial link; this firmware drives the four
//! cartridge modules, confirms every drop with the chamber sensor and
//! reports back.
//!
//! Everything runs in one cooperative loop ticking every millisecond.
//! The expander, EEPROM, scanner and display share a single I2C bus.

#![no_std]
#![no_main]

use core::cell::RefCell;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::{Duration, Ticker};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use pillex_core::dispense::ModuleId;
use pillex_core::input::sample;
use pillex_core::traits::{BusScanner, ExpanderPort, PersistentStore};
use pillex_core::Device;
use pillex_display::render;
use pillex_drivers::{At24, I2cScanner, Mcp23017, Sh1106};
use embedded_hal_bus::i2c::RefCellDevice;
use pillex_hal::{BlockingI2c, Clock, TxWriter};
use pillex_hal_rp2040::{Button, EmbassyClock, EmbassyDelay, SerialPort};
use pillex_protocol::ScreenId;

mod config;

/// Embedded configuration (compiled into firmware)
/// Edit device.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../device.toml");

/// Poll loop period
const TICK: Duration = Duration::from_millis(1);

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 1024]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Pillex firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = config::load(EMBEDDED_CONFIG);
    let hw = config.hardware;

    // Host link on UART0 (GPIO0 TX, GPIO1 RX), 115200 baud
    let tx_buf = TX_BUF.init([0u8; 1024]);
    let rx_buf = RX_BUF.init([0u8; 256]);
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, UartConfig::default());
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();
    let mut tx = SerialPort::new(tx);
    let mut rx = SerialPort::new(rx);
    info!("UART initialized for host link");

    // Shared I2C bus on I2C0 (GPIO4 SDA, GPIO5 SCL)
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = hw.i2c_frequency;
    let bus = RefCell::new(I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c_config));
    let device_on_bus = || BlockingI2c::new(RefCellDevice::new(&bus));
    info!("I2C initialized at {} Hz", hw.i2c_frequency);

    let mut display = Sh1106::new(device_on_bus(), hw.display_addr);
    if let Err(e) = display.init() {
        error!("Display init failed: {}", e);
        halt();
    }
    info!("Display initialized");

    let mut expander = Mcp23017::new(device_on_bus(), hw.expander_addr);
    let sensor_mask = ModuleId::all().fold(0u16, |mask, m| mask | 1 << m.lines().sensor);
    if let Err(e) = expander.set_pullups(sensor_mask) {
        error!("Expander not responding: {}", e);
        halt();
    }

    let store = At24::new(
        device_on_bus(),
        EmbassyDelay,
        hw.eeprom_addr,
        hw.eeprom_size,
        hw.eeprom_page_size,
    );
    let scanner = I2cScanner::new(device_on_bus());

    // Front panel buttons: OK, BACK, UP, DOWN
    let buttons = [
        Button::new(p.PIN_10),
        Button::new(p.PIN_11),
        Button::new(p.PIN_12),
        Button::new(p.PIN_13),
    ];

    let clock = EmbassyClock;
    let now = clock.now_ms();
    let mut device = Device::new(config, expander, store, scanner, now);

    if let Err(e) = device.boot(now, &mut TxWriter::new(&mut tx)) {
        error!("Boot failed: {}", e);
        halt();
    }
    info!("Cartridge id: {:02x}", device.cartridge_id());
    info!("Pillex running");

    let mut observed = Observed::new();
    let mut ticker = Ticker::every(TICK);
    loop {
        let now = clock.now_ms();
        let levels = sample(&buttons);

        let view = device.poll(now, &mut rx, levels, &mut TxWriter::new(&mut tx));
        if let Some(view) = view {
            if let Err(e) = render(&mut display, &view) {
                warn!("Display update failed: {}", e);
            }
        }

        observed.report(&device);
        ticker.next().await;
    }
}

/// Device state last seen by the logger
struct Observed {
    screen: ScreenId,
    io_faults: u32,
    host_lost: bool,
}

impl Observed {
    fn new() -> Self {
        Self {
            screen: ScreenId::default(),
            io_faults: 0,
            host_lost: false,
        }
    }

    /// Log transitions since the previous tick
    fn report<E, S, B>(&mut self, device: &Device<E, S, B>)
    where
        E: ExpanderPort,
        S: PersistentStore,
        B: BusScanner,
    {
        let screen = device.screen().current();
        if screen != self.screen {
            debug!("Screen {} -> {}", self.screen, screen);
            let module = device.drop_controller().last_module().map(|m| m.number());
            match screen {
                ScreenId::Success => info!("Drop confirmed (module {})", module),
                ScreenId::PillStuck => warn!("Pill stuck (module {})", module),
                _ => {}
            }
            self.screen = screen;
        }

        if device.io_faults() != self.io_faults {
            warn!("Expander I/O faults: {}", device.io_faults());
            self.io_faults = device.io_faults();
        }

        let host_lost = device.heartbeat().is_fault_latched();
        if host_lost != self.host_lost {
            if host_lost {
                warn!("Host silent, forcing error screen");
            } else {
                info!("Host link restored");
            }
            self.host_lost = host_lost;
        }
    }
}

/// Park the core after a fatal bring-up error
fn halt() -> ! {
    loop {
        cortex_m::asm::wfi();
    }
}
