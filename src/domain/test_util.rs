use crate::domain::DrivenPortError;
use anyhow::anyhow;

/// Connectivity represents the state of a faked backend and provides common behavior
/// for failing a driven port call the way a real backend would.
pub enum Connectivity {
    Connected,
    Disconnected,
    /// The backend answers, but refuses the session
    Unauthorized,
}

impl Connectivity {
    /// Return an error if the fake backend isn't answering normally
    pub fn blow_up_if_disconnected(&self) -> Result<(), DrivenPortError> {
        match self {
            Self::Connected => Ok(()),
            Self::Disconnected => Err(DrivenPortError::CommsFailure(anyhow!(
                "could not connect to the backend!"
            ))),
            Self::Unauthorized => Err(DrivenPortError::Unauthorized),
        }
    }
}

/// FakeImplementation stands in for one function of a mocked driven port. It records the
/// arguments of every call and hands back a scripted return value.
///
/// * `Args` is the captured argument tuple
/// * `Ret` is the function's return type
///
/// Mocks wrap themselves in a [std::sync::Mutex] so the async port methods, which only
/// receive `&self`, can still record calls.
pub struct FakeImplementation<Args, Ret> {
    saved_arguments: Vec<Args>,
    return_value: Option<Ret>,
}

impl<Args, Ret> FakeImplementation<Args, Ret> {
    pub fn new() -> FakeImplementation<Args, Ret> {
        FakeImplementation {
            saved_arguments: Vec::new(),
            return_value: None,
        }
    }

    /// Saves arguments from a single invocation of the FakeImplementation
    pub fn save_arguments(&mut self, arguments: Args) {
        self.saved_arguments.push(arguments)
    }

    /// Returns the list of arguments passed on every call to this FakeImplementation
    pub fn calls(&self) -> &[Args] {
        self.saved_arguments.as_slice()
    }
}

impl<Args, Success, Fail> FakeImplementation<Args, Result<Success, Fail>>
where
    Success: Clone,
    Fail: Clone,
{
    /// Set the result that should be returned when this FakeImplementation is invoked
    pub fn set_returned_result(&mut self, return_value: Result<Success, Fail>) {
        self.return_value = Some(return_value)
    }

    /// Retrieve a copy of the scripted result
    pub fn return_value_result(&self) -> Result<Success, Fail> {
        match self.return_value {
            Some(Ok(ref ok_result)) => Ok(ok_result.clone()),
            Some(Err(ref err)) => Err(err.clone()),
            None => panic!("Tried to return from a function where the return value wasn't set!"),
        }
    }
}
