use log::{error, info};
use winit::event_loop::EventLoop;

mod app;
mod camera;
mod error;
mod input;
mod light;
mod light_manager;
mod loader;
mod macros;
mod mesh;
mod renderer;
mod scene;
mod settings;
mod shadow;
mod sun;
mod texture;
mod three_d;

use scene::Scene;
use settings::RenderSettings;

const CONTROLS: &str = "\
controls:
  W/A/S/D, mouse, wheel   move, look and zoom the camera
  1/2/3/4                 select point, spot, directional lights or the sun
  Left/Right              previous/next light of the selected kind
  U/O I/K J/L             move the selected light up/down forward/back left/right
  +/-                     light movement speed
  P                       switch the selected light, or advance the sun phase
  Space                   toggle shadows
  R                       toggle secondary point lights
  Escape                  exit";

pub fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = RenderSettings::default();
    let data = match loader::load_scene(settings.light_data, settings.model_data) {
        Ok(data) => data,
        Err(err) => {
            error!("{err}");
            std::process::exit(1);
        }
    };
    let scene = Scene::init(data, &settings);
    info!("{CONTROLS}");

    let result = EventLoop::new()
        .map_err(Into::into)
        .and_then(|event_loop| app::run_app(event_loop, settings, scene));
    if let Err(err) = result {
        error!("{err}");
        std::process::exit(1);
    }
}
