// Session

macro_rules! log_session_established {
    ($proxy:expr, $destination:expr, $consumed:expr) => {
        info!(
            "\n\n\tSOCKS5 session has been ESTABLISHED: \
          \n\t\tclient <----> proxy [{}] <----> destination [{}] \
          \n\t\treply bytes consumed: {}\n",
            $proxy, $destination, $consumed
        );
    };
}

macro_rules! log_session_failed {
    ($proxy:expr, $destination:expr, $err:expr, $reply:expr) => {
        error!(
            "\n\n\tSOCKS5 session has FAILED: \
          \n\t\tproxy [{}] <----> destination [{}] \
          \n\t\treason: '{}' \
          \n\t\treply: '{:?}'\n",
            $proxy, $destination, $err, $reply
        );
    };
}

pub(crate) use log_session_established;
pub(crate) use log_session_failed;

// Handshake steps

macro_rules! log_step_started {
    ($step:expr, $proxy:expr) => {
        debug!("{} with proxy {}: ... ", $step, $proxy)
    };
}

macro_rules! log_step_completed {
    ($step:expr, $proxy:expr) => {
        debug!("{} with proxy {}: SUCCESS", $step, $proxy)
    };
}

pub(crate) use log_step_completed;
pub(crate) use log_step_started;
