//! Backend selection utilities for placenet.
//!
//! The backend is chosen at compile time through feature flags. None of the
//! choices is an autodiff backend, so evaluation never records a graph.

pub mod burn_backend_types {
    use cfg_if::cfg_if;

    cfg_if! {
        if #[cfg(feature = "cuda")] {
            use burn::backend::cuda::{Cuda, CudaDevice};

            /// Selected backend type
            pub type InferenceBackend = Cuda;
            /// Selected device type
            pub type InferenceDevice = CudaDevice;

            /// Backend name for logging purposes
            pub const NAME: &str = "CUDA (NVIDIA GPU)";
        } else if #[cfg(feature = "wgpu")] {
            use burn::backend::wgpu::{Wgpu, WgpuDevice};

            /// Selected backend type
            pub type InferenceBackend = Wgpu;
            /// Selected device type
            pub type InferenceDevice = WgpuDevice;

            /// Backend name for logging purposes
            pub const NAME: &str = "WGPU (GPU)";
        } else {
            // Default to ndarray backend
            use burn::backend::ndarray::{NdArray, NdArrayDevice};

            /// Selected backend type
            pub type InferenceBackend = NdArray;
            /// Selected device type
            pub type InferenceDevice = NdArrayDevice;

            /// Backend name for logging purposes
            pub const NAME: &str = "NdArray (CPU)";
        }
    }
}
