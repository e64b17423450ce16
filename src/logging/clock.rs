// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use jiff::Zoned;

/// The time source used for record timestamps and archive names.
///
/// Production code always uses the system clock; tests swap in a manual
/// clock so that timestamps and rotation collisions are deterministic.
#[derive(Debug)]
pub(crate) enum Clock {
    System,
    #[cfg(test)]
    Manual(ManualClock),
}

impl Clock {
    pub(crate) fn now(&self) -> Zoned {
        match self {
            Clock::System => Zoned::now(),
            #[cfg(test)]
            Clock::Manual(clock) => clock.now(),
        }
    }
}

/// A clock frozen at a caller-controlled instant.
#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) struct ManualClock {
    frozen: Zoned,
}

#[cfg(test)]
impl ManualClock {
    pub(crate) fn new(frozen: Zoned) -> ManualClock {
        ManualClock { frozen }
    }

    fn now(&self) -> Zoned {
        self.frozen.clone()
    }

    pub(crate) fn set_now(&mut self, now: Zoned) {
        self.frozen = now;
    }
}
