//! Console application state and menu actions

use crate::ui;
use ecg_acquisition::{
    diagnose, EcgPattern, EcgSimConfig, SampleScheduler, SampleSource, SimulatedEcgSource,
};
use ecg_core::{EcgError, EcgResult, FilterActivation, FilterKind, SampleRate};
use ecg_processing::diagnostics::DIAGNOSTIC_READINGS;
use ecg_processing::{export, plotter, AcquisitionConfig, AcquisitionStats, SharedActivity};
use std::future::Future;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Main menu entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Monitor,
    SetRate,
    Filters,
    Plotter,
    Export,
    Stats,
    Diagnostics,
    ClearBuffers,
    SensorPattern,
    Quit,
}

impl MenuAction {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(MenuAction::Monitor),
            "2" => Some(MenuAction::SetRate),
            "3" => Some(MenuAction::Filters),
            "4" => Some(MenuAction::Plotter),
            "5" => Some(MenuAction::Export),
            "6" => Some(MenuAction::Stats),
            "7" => Some(MenuAction::Diagnostics),
            "8" => Some(MenuAction::ClearBuffers),
            "9" => Some(MenuAction::SensorPattern),
            "0" | "q" | "quit" => Some(MenuAction::Quit),
            _ => None,
        }
    }
}

/// Filter submenu entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterAction {
    Toggle(FilterKind),
    AllOn,
    AllOff,
    RawOnly,
    Back,
}

impl FilterAction {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(FilterAction::Toggle(FilterKind::Raw)),
            "2" => Some(FilterAction::Toggle(FilterKind::MovingAverage)),
            "3" => Some(FilterAction::Toggle(FilterKind::Median)),
            "4" => Some(FilterAction::Toggle(FilterKind::Exponential)),
            "5" => Some(FilterAction::AllOn),
            "6" => Some(FilterAction::AllOff),
            "7" => Some(FilterAction::RawOnly),
            "0" | "" => Some(FilterAction::Back),
            _ => None,
        }
    }

    /// New activation after this choice; `Back` leaves it unchanged
    pub fn apply(self, mut activation: FilterActivation) -> FilterActivation {
        match self {
            FilterAction::Toggle(kind) => {
                activation.toggle(kind);
                activation
            },
            FilterAction::AllOn => FilterActivation::all_on(),
            FilterAction::AllOff => FilterActivation::all_off(),
            FilterAction::RawOnly => FilterActivation::raw_only(),
            FilterAction::Back => activation,
        }
    }
}

/// Wait for Ctrl+C, reporting it as an interruption of `operation`
async fn interrupted(operation: &'static str) -> EcgError {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Unable to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    EcgError::Interrupted { operation }
}

/// Next input line, unless `cancel` resolves first
async fn read_line_or_cancel<R, F>(lines: &mut Lines<R>, cancel: F) -> EcgResult<Option<String>>
where
    R: AsyncBufRead + Unpin,
    F: Future<Output = EcgError>,
{
    tokio::select! {
        biased;
        e = cancel => Err(e),
        line = lines.next_line() => Ok(line?),
    }
}

/// Preset chosen by its 1-based menu number
pub fn pattern_choice(input: &str) -> Option<(&'static str, EcgPattern)> {
    let index = input.trim().parse::<usize>().ok()?.checked_sub(1)?;
    EcgPattern::presets().into_iter().nth(index)
}

/// Console front end owning the scheduler and the shared pipeline
pub struct ConsoleApp {
    config: AcquisitionConfig,
    scheduler: SampleScheduler,
    indicator: SharedActivity,
    source_name: String,
    input: Lines<BufReader<Stdin>>,
}

impl ConsoleApp {
    pub fn new(config: AcquisitionConfig) -> anyhow::Result<Self> {
        config.validate()?;

        let sensor = SimulatedEcgSource::new(EcgSimConfig::default())?;
        let source_name = sensor.name().to_string();
        let indicator = SharedActivity::new();
        let scheduler = SampleScheduler::new(
            ecg_acquisition::source::shared(sensor),
            config.build_pipeline().shared(),
            Arc::new(indicator.clone()),
        );

        Ok(Self {
            config,
            scheduler,
            indicator,
            source_name,
            input: BufReader::new(tokio::io::stdin()).lines(),
        })
    }

    /// Initial diagnosis, start sampling, then serve the menu until quit or EOF
    pub async fn run(&mut self) -> anyhow::Result<()> {
        println!("{}", ui::banner(&self.source_name, self.config.sample_rate));

        self.report(MenuAction::Diagnostics).await;
        self.scheduler.start(self.config.sample_rate).await;

        let outcome = self.menu_loop().await;
        self.shutdown().await;
        outcome
    }

    /// Serve the main menu; quit, EOF and Ctrl+C all end it
    async fn menu_loop(&mut self) -> anyhow::Result<()> {
        loop {
            println!("{}", ui::main_menu(self.scheduler.state(), self.indicator.is_active()));
            let line = match self.prompt("Option: ").await {
                Ok(Some(line)) => line,
                Ok(None) => return Ok(()),
                Err(e) if e.is_interruption() => {
                    println!();
                    return Ok(());
                },
                Err(e) => return Err(e.into()),
            };

            match MenuAction::parse(&line) {
                Some(MenuAction::Quit) => return Ok(()),
                Some(action) => self.report(action).await,
                None => println!("Invalid option: {}", line.trim()),
            }
        }
    }

    /// Run one action, turning its error into operator feedback
    async fn report(&mut self, action: MenuAction) {
        debug!(?action, "Menu action");
        match self.dispatch(action).await {
            Ok(()) => {},
            Err(e) if e.is_interruption() => println!("\n{}. Back to the menu.", e),
            Err(e @ EcgError::EmptyData { .. }) => println!("{}. Start acquiring first.", e),
            Err(e) => {
                warn!(?action, "Action failed: {}", e);
                println!("Error: {}", e);
            },
        }
    }

    async fn dispatch(&mut self, action: MenuAction) -> EcgResult<()> {
        match action {
            MenuAction::Monitor => self.monitor().await,
            MenuAction::SetRate => self.set_rate().await,
            MenuAction::Filters => self.configure_filters().await,
            MenuAction::Plotter => self.plotter().await,
            MenuAction::Export => self.export().await,
            MenuAction::Stats => self.stats().await,
            MenuAction::Diagnostics => self.diagnostics().await,
            MenuAction::ClearBuffers => self.clear_buffers().await,
            MenuAction::SensorPattern => self.select_pattern().await,
            MenuAction::Quit => Ok(()),
        }
    }

    async fn monitor(&mut self) -> EcgResult<()> {
        println!("Acquiring at {}. Press Ctrl+C to stop.", self.current_rate());

        let started = Instant::now();
        let baseline = self.scheduler.ticks();
        let mut ticker = interval(Duration::from_secs(1));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        let cancel = interrupted("acquisition monitor");
        tokio::pin!(cancel);

        loop {
            tokio::select! {
                e = &mut cancel => return Err(e),
                _ = ticker.tick() => {
                    let samples = self.scheduler.ticks() - baseline;
                    println!(
                        "{}",
                        ui::monitor_line(started.elapsed(), samples, self.indicator.is_active())
                    );
                },
            }
        }
    }

    async fn set_rate(&mut self) -> EcgResult<()> {
        let prompt = format!(
            "Sample rate in Hz ({}-{}): ",
            SampleRate::MIN_HZ,
            SampleRate::MAX_HZ
        );
        let Some(line) = self.prompt(&prompt).await? else {
            return Ok(());
        };

        let hz: u32 = match line.trim().parse() {
            Ok(hz) => hz,
            Err(_) => {
                println!("Not a number: {}", line.trim());
                return Ok(());
            },
        };

        let rate = self.config.set_sample_rate(hz)?;
        self.scheduler.reconfigure(rate).await;
        println!("Sample rate set to {} (period {:?})", rate, rate.period());
        Ok(())
    }

    async fn configure_filters(&mut self) -> EcgResult<()> {
        let pipeline = self.scheduler.pipeline();

        loop {
            let activation = pipeline.lock().await.activation();
            println!("{}", ui::filter_menu(activation));

            let Some(line) = self.prompt("Option: ").await? else {
                return Ok(());
            };
            let Some(action) = FilterAction::parse(&line) else {
                println!("Invalid option: {}", line.trim());
                continue;
            };
            if action == FilterAction::Back {
                return Ok(());
            }

            let updated = action.apply(activation);
            pipeline.lock().await.set_activation(updated);
            self.config.activation = updated;
            info!(?updated, "Filter activation changed");
        }
    }

    async fn plotter(&mut self) -> EcgResult<()> {
        let (snapshot, activation) = {
            let pipeline = self.scheduler.pipeline();
            let pipeline = pipeline.lock().await;
            (pipeline.bank().snapshot(), pipeline.activation())
        };
        let lines = plotter::lines(&snapshot, activation, self.config.plotter_limit)?;

        println!("{}", plotter::header(activation));

        let mut ticker = interval(self.current_rate().period());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let cancel = interrupted("plotter");
        tokio::pin!(cancel);

        for line in &lines {
            tokio::select! {
                e = &mut cancel => return Err(e),
                _ = ticker.tick() => println!("{}", line),
            }
        }
        println!("{} lines shown", lines.len());
        Ok(())
    }

    async fn export(&mut self) -> EcgResult<()> {
        let snapshot = self.scheduler.pipeline().lock().await.bank().snapshot();
        let report = export::export_to_dir(&snapshot, &self.config.export_dir)?;
        println!("Exported {} rows to {}", report.rows, report.path.display());
        Ok(())
    }

    async fn stats(&mut self) -> EcgResult<()> {
        let rate = self.current_rate();
        let pipeline = self.scheduler.pipeline();
        let stats = AcquisitionStats::collect(&*pipeline.lock().await, rate);
        println!("{}", ui::stats(&stats));
        Ok(())
    }

    async fn diagnostics(&mut self) -> EcgResult<()> {
        println!("Taking {} readings...", DIAGNOSTIC_READINGS);
        let spacing = Duration::from_millis(self.config.diagnostic_interval_ms);
        let source = self.scheduler.source();
        let result = tokio::select! {
            e = interrupted("diagnostics") => return Err(e),
            result = diagnose(&source, DIAGNOSTIC_READINGS, spacing) => result?,
        };
        println!("{}", ui::diagnosis(&result));
        Ok(())
    }

    async fn clear_buffers(&mut self) -> EcgResult<()> {
        self.scheduler.pipeline().lock().await.reset();
        info!("Sample history cleared");
        println!("All streams cleared.");
        Ok(())
    }

    async fn select_pattern(&mut self) -> EcgResult<()> {
        println!("{}", ui::pattern_menu(&EcgPattern::presets()));
        let Some(line) = self.prompt("Pattern: ").await? else {
            return Ok(());
        };
        let Some((name, pattern)) = pattern_choice(&line) else {
            println!("Invalid option: {}", line.trim());
            return Ok(());
        };

        if self.scheduler.source().lock().await.set_pattern(pattern) {
            info!(pattern = name, "Simulated pattern changed");
            println!("Sensor now generating: {} ({})", name, pattern.description());
        } else {
            println!("{} does not generate patterns", self.source_name);
        }
        Ok(())
    }

    async fn shutdown(&mut self) {
        self.scheduler.stop().await;
        println!("Acquisition stopped, activity indicator off.");
    }

    fn current_rate(&self) -> SampleRate {
        self.scheduler.rate().unwrap_or(self.config.sample_rate)
    }

    /// Read one line; Ctrl+C while waiting is reported as an interruption
    async fn prompt(&mut self, text: &str) -> EcgResult<Option<String>> {
        print!("{}", text);
        std::io::stdout().flush()?;
        read_line_or_cancel(&mut self.input, interrupted("input")).await
    }
}
