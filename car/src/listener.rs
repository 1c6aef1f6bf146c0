use std::sync::Arc;

use parking_lot::Mutex;

use crate::car::Car;

/// Emitted by a car each time it is stopped at the floor it was addressing.
#[derive(Debug, Clone, Copy)]
pub struct StopEvent<'a> {
    floor: u8,
    car: &'a Car,
}

impl<'a> StopEvent<'a> {
    pub fn new(floor: u8, car: &'a Car) -> Self {
        StopEvent { floor, car }
    }

    pub fn floor(&self) -> u8 {
        self.floor
    }

    pub fn car(&self) -> &'a Car {
        self.car
    }
}

/// Anything that wants to hear about a car's stops, e.g. a simulated
/// passenger.
///
/// Called on the car's movement thread with no car lock held, so it may call
/// back into the car (`enter`, `leave`, `remove_listener`). It must not block
/// for long: the car does not move until every listener has returned.
pub trait StopListener: Send + Sync {
    /// Returns true if the listener should be unregistered after this event.
    fn on_stop_event(&self, event: &StopEvent<'_>) -> bool;
}

struct Registration {
    generation: u64,
    listener: Arc<dyn StopListener>,
}

#[derive(Default)]
struct ListenerSet {
    registrations: Vec<Registration>,
    next_generation: u64,
}

/// Registered listeners of one car, compared by identity.
///
/// Every registration carries a generation. A listener that asks to leave is
/// only dropped if it was not registered again while the round was running.
#[derive(Default)]
pub struct Listeners {
    set: Mutex<ListenerSet>,
}

fn same_listener(a: &Arc<dyn StopListener>, b: &Arc<dyn StopListener>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

impl Listeners {
    /// Returns false if the listener was already registered.
    pub fn add(&self, listener: Arc<dyn StopListener>) -> bool {
        let mut set = self.set.lock();
        let generation = set.next_generation;
        set.next_generation += 1;

        if let Some(existing) = set
            .registrations
            .iter_mut()
            .find(|r| same_listener(&r.listener, &listener))
        {
            existing.generation = generation;
            return false;
        }
        set.registrations.push(Registration { generation, listener });
        true
    }

    /// Returns false if the listener was not registered.
    pub fn remove(&self, listener: &Arc<dyn StopListener>) -> bool {
        let mut set = self.set.lock();
        let before = set.registrations.len();
        set.registrations.retain(|r| !same_listener(&r.listener, listener));
        set.registrations.len() != before
    }

    pub fn len(&self) -> usize {
        self.set.lock().registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Notifies every listener registered when the round starts, then drops
    /// the ones that asked to be unregistered.
    pub fn notify(&self, event: &StopEvent<'_>) -> usize {
        let snapshot: Vec<(u64, Arc<dyn StopListener>)> = self
            .set
            .lock()
            .registrations
            .iter()
            .map(|r| (r.generation, Arc::clone(&r.listener)))
            .collect();

        let finished: Vec<(u64, Arc<dyn StopListener>)> = snapshot
            .into_iter()
            .filter(|(_, listener)| listener.on_stop_event(event))
            .collect();

        if !finished.is_empty() {
            self.set.lock().registrations.retain(|r| {
                !finished
                    .iter()
                    .any(|(generation, done)| r.generation == *generation && same_listener(&r.listener, done))
            });
        }
        finished.len()
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners").field("len", &self.len()).finish()
    }
}
