//! Resolution of a validated [`PeripheralConfig`] into the form the emitter
//! consumes: defaults applied, keywords resolved, shared pins merged and
//! everything in a stable order.

use crate::codegen::GenerationError;
use crate::model::{
    defaults, AddressingMode, AltFunction, BoardConfig, Choice, ClockDivision, CounterMode,
    Direction, DutyCycle, FlowControl, I2cConfig, Keyword, Parity, PeripheralConfig,
    PeripheralKind, PeripheralRef, PinConfig, PinId, Pull, Speed, StopBits, TimerConfig,
    TimerMode, UartConfig, WordLength,
};
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedBoard {
    pub name: String,
    pub hal_family: String,
    pub timer_clock_hz: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPin {
    pub id: PinId,
    pub direction: Direction,
    pub pull: Pull,
    pub speed: Speed,
    pub alt_function: Option<String>,
    pub comment: Option<String>,
}

/// Which UART lines are in use, from the pins the instance references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    TxRx,
    Tx,
    Rx,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedUart {
    pub instance: String,
    pub baudrate: u32,
    pub word_length: WordLength,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub flow_control: FlowControl,
    pub mode: TransferMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedI2c {
    pub instance: String,
    pub speed: u32,
    pub addressing_mode: AddressingMode,
    pub own_address: u16,
    pub duty_cycle: DutyCycle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PwmOutput {
    pub channel: u8,
    pub duty_cycle: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTimer {
    pub instance: String,
    /// Divisor counts as written; registers take one less.
    pub prescaler: u64,
    pub period: u64,
    pub counter_mode: CounterMode,
    pub clock_division: ClockDivision,
    pub pwm: Option<PwmOutput>,
}

impl NormalizedTimer {
    /// Compare value giving the configured duty cycle over one period.
    pub fn pulse(&self) -> Option<u64> {
        self.pwm
            .map(|pwm| self.period * u64::from(pwm.duty_cycle) / 100)
    }
}

/// One peripheral init routine, in emission order.
#[derive(Debug, Clone, Copy)]
pub enum Routine<'a> {
    Uart(&'a NormalizedUart),
    I2c(&'a NormalizedI2c),
    Timer(&'a NormalizedTimer),
}

impl<'a> Routine<'a> {
    pub fn instance(&self) -> &'a str {
        match self {
            Routine::Uart(u) => &u.instance,
            Routine::I2c(c) => &c.instance,
            Routine::Timer(t) => &t.instance,
        }
    }
}

/// Enabled peripherals only, ready for emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedConfig {
    pub board: NormalizedBoard,
    pub pins: Vec<NormalizedPin>,
    pub uarts: Vec<NormalizedUart>,
    pub i2cs: Vec<NormalizedI2c>,
    pub timers: Vec<NormalizedTimer>,
}

impl NormalizedConfig {
    /// Distinct GPIO ports in order of first appearance.
    pub fn gpio_ports(&self) -> Vec<char> {
        let mut ports: Vec<char> = Vec::new();
        for pin in &self.pins {
            if !ports.contains(&pin.id.port) {
                ports.push(pin.id.port);
            }
        }
        ports
    }

    /// UART, then I2C, then timer routines.
    pub fn routines(&self) -> impl Iterator<Item = Routine<'_>> {
        self.uarts
            .iter()
            .map(Routine::Uart)
            .chain(self.i2cs.iter().map(Routine::I2c))
            .chain(self.timers.iter().map(Routine::Timer))
    }
}

/// Orders instance names with embedded numbers numerically, so `USART2`
/// sorts before `USART10`.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    fn split(name: &str) -> (&str, Option<u64>) {
        let prefix = name.trim_end_matches(|c: char| c.is_ascii_digit());
        (prefix, name[prefix.len()..].parse().ok())
    }
    split(a).cmp(&split(b)).then_with(|| a.cmp(b))
}

fn invariant(at: &PeripheralRef, field: &str, reason: impl Into<String>) -> GenerationError {
    GenerationError::Invariant {
        path: at.field(field),
        reason: reason.into(),
    }
}

fn resolve<T: Keyword>(at: &PeripheralRef, field: &str, choice: &Choice<T>) -> Result<T, GenerationError> {
    choice
        .known()
        .ok_or_else(|| invariant(at, field, format!("unrecognized value `{}`", choice)))
}

fn convert<T: TryFrom<i64>>(at: &PeripheralRef, field: &str, value: i64) -> Result<T, GenerationError> {
    T::try_from(value).map_err(|_| invariant(at, field, format!("value {} is out of range", value)))
}

/// Resolve a validated configuration for emission.
///
/// Fails with [`GenerationError::Invariant`] when the configuration still
/// holds something validation should have rejected.
pub fn normalize(config: &PeripheralConfig) -> Result<NormalizedConfig, GenerationError> {
    let board = normalize_board(&config.board);
    let pins = normalize_pins(&config.pins)?;

    let mut uarts = Vec::new();
    for (index, uart) in config.uarts.iter().enumerate() {
        if !uart.enabled {
            tracing::debug!("Skipping disabled {}", uart.instance);
            continue;
        }
        let at = PeripheralRef::new(PeripheralKind::Uart, index, &uart.instance);
        uarts.push(normalize_uart(&at, uart)?);
    }
    uarts.sort_by(|a, b| natural_cmp(&a.instance, &b.instance));

    let mut i2cs = Vec::new();
    for (index, i2c) in config.i2cs.iter().enumerate() {
        if !i2c.enabled {
            tracing::debug!("Skipping disabled {}", i2c.instance);
            continue;
        }
        let at = PeripheralRef::new(PeripheralKind::I2c, index, &i2c.instance);
        i2cs.push(normalize_i2c(&at, i2c)?);
    }
    i2cs.sort_by(|a, b| natural_cmp(&a.instance, &b.instance));

    let mut timers = Vec::new();
    for (index, timer) in config.timers.iter().enumerate() {
        if !timer.enabled {
            tracing::debug!("Skipping disabled {}", timer.instance);
            continue;
        }
        let at = PeripheralRef::new(PeripheralKind::Timer, index, &timer.instance);
        timers.push(normalize_timer(&at, timer)?);
    }
    timers.sort_by(|a, b| natural_cmp(&a.instance, &b.instance));

    let normalized = NormalizedConfig {
        board,
        pins,
        uarts,
        i2cs,
        timers,
    };
    tracing::debug!(
        "Normalized {} pins on {} ports, {} routines",
        normalized.pins.len(),
        normalized.gpio_ports().len(),
        normalized.routines().count()
    );
    Ok(normalized)
}

fn normalize_board(board: &BoardConfig) -> NormalizedBoard {
    let hal_family = board.hal_family().unwrap_or_else(|| {
        tracing::debug!("No recognized MCU; using {}", defaults::HAL_FAMILY);
        defaults::HAL_FAMILY.to_string()
    });
    NormalizedBoard {
        name: board.display_name().to_string(),
        hal_family,
        timer_clock_hz: board.timer_clock_hz(),
    }
}

fn normalize_pins(pins: &[PinConfig]) -> Result<Vec<NormalizedPin>, GenerationError> {
    let mut resolved: Vec<(NormalizedPin, bool, PeripheralRef)> = Vec::with_capacity(pins.len());
    for (index, pin) in pins.iter().enumerate() {
        let at = PeripheralRef::new(PeripheralKind::Pin, index, &pin.pin);
        let id = PinId::parse(&pin.pin).map_err(|e| invariant(&at, "pin", e.to_string()))?;
        let direction = match &pin.direction {
            Some(choice) => resolve(&at, "direction", choice)?,
            None => {
                let direction = defaults::direction_for(pin.alt_function.as_deref());
                tracing::debug!("{} defaults to direction {}", id, direction.keyword());
                direction
            }
        };
        if let Some(af) = &pin.alt_function {
            if AltFunction::parse(af).is_none() {
                return Err(invariant(&at, "alt_function", format!("malformed selector `{}`", af)));
            }
        }
        let comment = pin
            .comment
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        resolved.push((
            NormalizedPin {
                id,
                direction,
                pull: resolve(&at, "pull", &pin.pull)?,
                speed: resolve(&at, "speed", &pin.speed)?,
                alt_function: pin.alt_function.clone(),
                comment,
            },
            pin.shared,
            at,
        ));
    }

    // Stable: shared declarations of one pin stay in document order.
    resolved.sort_by_key(|(pin, _, _)| pin.id);

    let mut merged: Vec<NormalizedPin> = Vec::with_capacity(resolved.len());
    let mut last_shared = false;
    for (pin, shared, at) in resolved {
        if merged.last().map_or(true, |previous| previous.id != pin.id) {
            last_shared = shared;
            merged.push(pin);
            continue;
        }
        let Some(previous) = merged.last_mut() else {
            continue;
        };
        if !(shared && last_shared) {
            return Err(invariant(&at, "pin", format!("{} is declared more than once", pin.id)));
        }
        if (previous.direction, previous.pull, previous.speed, &previous.alt_function)
            != (pin.direction, pin.pull, pin.speed, &pin.alt_function)
        {
            return Err(invariant(
                &at,
                "pin",
                format!("shared pin {} is configured differently", pin.id),
            ));
        }
        previous.comment = match (previous.comment.take(), pin.comment) {
            (Some(a), Some(b)) if a != b => Some(format!("{}; {}", a, b)),
            (a, b) => a.or(b),
        };
        tracing::debug!("Merged shared declaration of {}", pin.id);
    }
    Ok(merged)
}

fn normalize_uart(at: &PeripheralRef, uart: &UartConfig) -> Result<NormalizedUart, GenerationError> {
    let baudrate = uart
        .baudrate
        .ok_or_else(|| invariant(at, "baudrate", "no baud rate"))?;
    let mode = match (&uart.tx_pin, &uart.rx_pin) {
        (Some(_), None) => TransferMode::Tx,
        (None, Some(_)) => TransferMode::Rx,
        _ => TransferMode::TxRx,
    };
    Ok(NormalizedUart {
        instance: uart.instance.clone(),
        baudrate: convert(at, "baudrate", baudrate)?,
        word_length: WordLength::from_bits(uart.data_bits)
            .ok_or_else(|| invariant(at, "data_bits", format!("{} data bits", uart.data_bits)))?,
        parity: resolve(at, "parity", &uart.parity)?,
        stop_bits: StopBits::from_count(uart.stop_bits)
            .ok_or_else(|| invariant(at, "stop_bits", format!("{} stop bits", uart.stop_bits)))?,
        flow_control: resolve(at, "flow_control", &uart.flow_control)?,
        mode,
    })
}

fn normalize_i2c(at: &PeripheralRef, i2c: &I2cConfig) -> Result<NormalizedI2c, GenerationError> {
    Ok(NormalizedI2c {
        instance: i2c.instance.clone(),
        speed: convert(at, "speed", i2c.speed)?,
        addressing_mode: resolve(at, "addressing_mode", &i2c.addressing_mode)?,
        own_address: convert(at, "own_address", i2c.own_address)?,
        duty_cycle: resolve(at, "duty_cycle", &i2c.duty_cycle)?,
    })
}

fn normalize_timer(at: &PeripheralRef, timer: &TimerConfig) -> Result<NormalizedTimer, GenerationError> {
    let prescaler = timer
        .prescaler
        .ok_or_else(|| invariant(at, "prescaler", "no prescaler"))?;
    let period = timer
        .period
        .ok_or_else(|| invariant(at, "period", "no period"))?;
    let prescaler: u64 = convert(at, "prescaler", prescaler)?;
    let period: u64 = convert(at, "period", period)?;
    if prescaler == 0 || period == 0 {
        return Err(invariant(at, "period", "divisors must be at least 1"));
    }

    let pwm = match resolve(at, "mode", &timer.mode)? {
        TimerMode::Basic => None,
        TimerMode::Pwm => {
            let channel = timer
                .channel
                .ok_or_else(|| invariant(at, "channel", "pwm timer without channel"))?;
            let duty_cycle = timer
                .duty_cycle
                .ok_or_else(|| invariant(at, "duty_cycle", "pwm timer without duty cycle"))?;
            Some(PwmOutput {
                channel: convert(at, "channel", channel)?,
                duty_cycle: convert(at, "duty_cycle", duty_cycle)?,
            })
        }
    };

    Ok(NormalizedTimer {
        instance: timer.instance.clone(),
        prescaler,
        period,
        counter_mode: resolve(at, "counter_mode", &timer.counter_mode)?,
        clock_division: ClockDivision::from_divisor(timer.clock_division).ok_or_else(|| {
            invariant(
                at,
                "clock_division",
                format!("clock division {}", timer.clock_division),
            )
        })?,
        pwm,
    })
}
