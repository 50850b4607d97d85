//! The interactive loop: ask, look up weather, ask for advice, print.

use std::io::Write;

use irrigation_core::{Advisor, Error, RecommendationRequest, WeatherProvider, WeatherRecord, validate};
use tracing::{debug, info};

use crate::{
    input::{Field, Prompter},
    render,
};

/// Where a turn currently is.
#[derive(Debug, Clone, PartialEq)]
pub enum State {
    AwaitingInput,
    FetchingWeather { crop_type: String, location: String },
    GeneratingAdvice { crop_type: String, weather: WeatherRecord },
    Exit,
}

pub struct Session<'a, P, W> {
    prompter: P,
    out: W,
    weather: &'a dyn WeatherProvider,
    advisor: &'a dyn Advisor,
}

impl<'a, P: Prompter, W: Write> Session<'a, P, W> {
    pub fn new(
        prompter: P,
        out: W,
        weather: &'a dyn WeatherProvider,
        advisor: &'a dyn Advisor,
    ) -> Self {
        Self { prompter, out, weather, advisor }
    }

    /// Run turns until the user leaves.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        render::banner(&mut self.out)?;

        let mut state = State::AwaitingInput;
        while state != State::Exit {
            state = self.step(state).await?;
        }

        render::goodbye(&mut self.out)?;
        Ok(())
    }

    /// Advance by one state.
    ///
    /// Errors from the weather or advice services are reported here and the
    /// session goes back to waiting for input. Only I/O on the console fails.
    pub async fn step(&mut self, state: State) -> anyhow::Result<State> {
        debug!(?state, "session step");

        let next = match state {
            State::AwaitingInput => self.read_turn()?,

            State::FetchingWeather { crop_type, location } => {
                render::fetching_weather(&mut self.out, &location)?;
                match self.weather.current_weather(&location).await {
                    Ok(weather) => State::GeneratingAdvice { crop_type, weather },
                    Err(e) => self.recover(&e)?,
                }
            }

            State::GeneratingAdvice { crop_type, weather } => {
                render::generating_advice(&mut self.out, &crop_type)?;
                let request = RecommendationRequest::new(crop_type, weather);
                match self.advisor.recommend(&request).await {
                    Ok(text) => {
                        render::report(&mut self.out, &request, &text)?;
                        State::AwaitingInput
                    }
                    Err(e) => self.recover(&e)?,
                }
            }

            State::Exit => State::Exit,
        };

        Ok(next)
    }

    fn read_turn(&mut self) -> anyhow::Result<State> {
        let Some(crop_type) = self.ask(Field::Crop, validate::crop_type)? else {
            return Ok(State::Exit);
        };
        let Some(location) = self.ask(Field::Location, validate::location)? else {
            return Ok(State::Exit);
        };

        Ok(State::FetchingWeather { crop_type, location })
    }

    /// Ask until the answer validates. `None` when the user wants out.
    fn ask(
        &mut self,
        field: Field,
        check: fn(&str) -> irrigation_core::Result<String>,
    ) -> anyhow::Result<Option<String>> {
        loop {
            let Some(answer) = self.prompter.ask(field)? else {
                return Ok(None);
            };
            if validate::is_exit_keyword(&answer) {
                info!(?field, "exit requested");
                return Ok(None);
            }
            match check(&answer) {
                Ok(value) => return Ok(Some(value)),
                Err(e) => render::validation(&mut self.out, &e)?,
            }
        }
    }

    fn recover(&mut self, err: &Error) -> anyhow::Result<State> {
        info!(error = %err, "turn failed");
        render::failure(&mut self.out, err)?;
        Ok(State::AwaitingInput)
    }
}
