use std::iter::once;
use std::mem::size_of;
use std::sync::{Arc, Mutex};

use bytemuck::bytes_of;
use bytemuck_derive::{Pod, Zeroable};
use log::debug;
use nalgebra::{point, Point2, Point3};
use raw_window_handle::{HasRawDisplayHandle, HasRawWindowHandle};
use thiserror::Error;
use wgpu::{BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingResource, BindingType, Buffer, BufferUsages, ColorTargetState, ColorWrites, CommandEncoderDescriptor, CreateSurfaceError, DeviceDescriptor, Extent3d, FragmentState, ImageCopyTexture, ImageDataLayout, include_wgsl, InstanceDescriptor, LoadOp, Operations, Origin3d, PipelineLayoutDescriptor, PrimitiveState, PrimitiveTopology, RenderPassColorAttachment, RenderPassDescriptor, RenderPipeline, RenderPipelineDescriptor, RequestAdapterOptions, RequestDeviceError, SamplerBindingType, ShaderStages, Surface, SurfaceConfiguration, SurfaceError, TextureAspect, TextureDescriptor, TextureDimension, TextureSampleType, TextureUsages, TextureViewDescriptor, TextureViewDimension, vertex_attr_array, VertexBufferLayout, VertexState, VertexStepMode};
use wgpu::util::{BufferInitDescriptor, DeviceExt};

use crate::framebuffer::Framebuffer;
use crate::picture::{PixelFormat, RGBA8};

#[derive(Debug, Error)]
pub enum PresenterError {
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("failed to create surface: {0}")]
    Surface(#[from] CreateSurfaceError),
    #[error("no compatible graphics adapter found")]
    NoAdapter,
    #[error("failed to request device: {0}")]
    Device(#[from] RequestDeviceError),
    #[error("surface is not supported by the adapter")]
    UnsupportedSurface,
}

#[derive(Default, Copy, Clone, Pod, Zeroable)]
#[repr(C)]
struct Vertex {
    position: Point3<f32>,
    tex: Point2<f32>,
}

// Texture row 0 is drawn along the bottom edge.
const VERTEX_DATA: [Vertex; 4] = [
    Vertex {
        position: point![-1.0, 1.0, 0.0],
        tex: point![0.0, 1.0],
    },
    Vertex {
        position: point![-1.0, -1.0, 0.0],
        tex: point![0.0, 0.0],
    },
    Vertex {
        position: point![1.0, 1.0, 0.0],
        tex: point![1.0, 1.0],
    },
    Vertex {
        position: point![1.0, -1.0, 0.0],
        tex: point![1.0, 0.0],
    },
];

/// Blits the shared display buffer to the window surface.
pub struct Renderer {
    gpu: Gpu,
    vertex_buffer: Buffer,
    surface: Surface,
    surface_config: SurfaceConfiguration,
    screen: Screen<RGBA8>,
}

impl Renderer {
    pub fn new(gpu: Gpu, surface: Surface, window_size: (u32, u32), frame_size: (u32, u32)) -> Result<Self, PresenterError> {
        let (width, height) = window_size;
        let mut surface_config = surface.get_default_config(&gpu.adapter, width, height)
            .ok_or(PresenterError::UnsupportedSurface)?;
        surface_config.format = surface_config.format.remove_srgb_suffix();
        surface.configure(&gpu.device, &surface_config);
        debug!(target: "app", "Surface: {:?}", surface_config);

        let vertex_buffer = gpu.device.create_buffer_init(&BufferInitDescriptor {
            label: None,
            usage: BufferUsages::VERTEX,
            contents: bytes_of(&VERTEX_DATA),
        });
        let screen = Screen::new(&gpu, surface_config.format, frame_size);

        Ok(Renderer {
            gpu,
            vertex_buffer,
            surface,
            surface_config,
            screen,
        })
    }

    /// Reconfigures the surface. The display buffer keeps its size and is stretched.
    pub fn surface_resize(&mut self, size: (u32, u32)) {
        let (width, height) = size;
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.gpu.device, &self.surface_config);
    }

    pub fn render(&self) {
        let target = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(SurfaceError::Timeout) => return,
            Err(err) => panic!("current surface texture: {}", err),
        };
        let target_view = target.texture.create_view(&TextureViewDescriptor::default());

        {
            let frame = self.screen.display.lock().expect("display upload");
            self.gpu.queue.write_texture(
                ImageCopyTexture {
                    texture: &self.screen.texture,
                    mip_level: 0,
                    aspect: TextureAspect::All,
                    origin: Origin3d::ZERO,
                },
                frame.bytes(),
                ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(size_of::<RGBA8>() as u32 * frame.width()),
                    rows_per_image: Some(frame.height()),
                },
                Extent3d {
                    width: frame.width(),
                    height: frame.height(),
                    depth_or_array_layers: 1,
                },
            );
        }

        let mut encoder = self.gpu.device.create_command_encoder(&CommandEncoderDescriptor::default());

        {
            let mut render_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: None,
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &target_view,
                    ops: Operations {
                        load: LoadOp::Clear(wgpu::Color::WHITE),
                        store: true,
                    },
                    resolve_target: None,
                })],
                depth_stencil_attachment: None,
            });
            render_pass.set_pipeline(&self.screen.pipeline);
            render_pass.set_bind_group(0, &self.screen.bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            render_pass.draw(0..4, 0..1);
        }

        let commands = encoder.finish();
        self.gpu.queue.submit(once(commands));

        target.present();
    }

    /// Buffer shown on the next redraw. Written by the render worker.
    pub fn display(&self) -> Arc<Mutex<Framebuffer<RGBA8>>> {
        self.screen.display.clone()
    }
}

struct Screen<P> {
    display: Arc<Mutex<Framebuffer<P>>>,
    texture: wgpu::Texture,
    pipeline: RenderPipeline,
    bind_group: BindGroup,
}

impl<P: PixelFormat + Default + Clone> Screen<P> {
    fn new(gpu: &Gpu, target_format: wgpu::TextureFormat, size: (u32, u32)) -> Self {
        let (width, height) = size;
        let display = Framebuffer::<P>::new(size);

        let texture = gpu.device.create_texture(&TextureDescriptor {
            label: None,
            size: Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: P::texture_format(),

            usage: TextureUsages::COPY_DST | TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let sampler = gpu.device.create_sampler(&Default::default());

        let texture_bind_group_layout = gpu.device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: None,
            entries: &[
                BindGroupLayoutEntry {
                    count: None,
                    binding: 0,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Texture {
                        multisampled: false,
                        sample_type: TextureSampleType::Float { filterable: false },
                        view_dimension: TextureViewDimension::D2,
                    },
                },
                BindGroupLayoutEntry {
                    count: None,
                    binding: 1,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Sampler(SamplerBindingType::NonFiltering),
                },
            ],
        });

        let module = gpu.device.create_shader_module(include_wgsl!("shader.wgsl"));
        let pipeline_layout = gpu.device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: None,
            bind_group_layouts: &[&texture_bind_group_layout],
            push_constant_ranges: &[],
        });
        let pipeline = gpu.device.create_render_pipeline(&RenderPipelineDescriptor {
            label: None,
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module: &module,
                entry_point: "vertex_main",
                buffers: &[
                    VertexBufferLayout {
                        array_stride: size_of::<Vertex>() as _,
                        attributes: &vertex_attr_array![0 => Float32x3, 1 => Float32x2],
                        step_mode: VertexStepMode::Vertex,
                    },
                ],
            },
            primitive: PrimitiveState {
                topology: PrimitiveTopology::TriangleStrip,

                ..Default::default()
            },

            depth_stencil: None,
            multisample: Default::default(),
            fragment: Some(FragmentState {
                module: &module,
                entry_point: "fragment_main",
                targets: &[Some(ColorTargetState {
                    format: target_format,
                    blend: None,
                    write_mask: ColorWrites::COLOR,
                })],
            }),
            multiview: None,
        });

        let texture_view = texture.create_view(&TextureViewDescriptor::default());
        let bind_group = gpu.device.create_bind_group(&BindGroupDescriptor {
            label: None,
            layout: &texture_bind_group_layout,
            entries: &[
                BindGroupEntry {
                    binding: 0,
                    resource: BindingResource::TextureView(&texture_view),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: BindingResource::Sampler(&sampler),
                },
            ],
        });

        Screen {
            display: Arc::new(Mutex::new(display)),
            texture,
            pipeline,
            bind_group,
        }
    }
}

pub struct Gpu {
    _instance: wgpu::Instance,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl Gpu {
    /// Creates the instance and a surface for `window`, then picks an adapter able to present to it.
    pub async fn new<W>(window: &W) -> Result<(Self, Surface), PresenterError>
        where W: HasRawWindowHandle + HasRawDisplayHandle {
        let instance = wgpu::Instance::new(InstanceDescriptor::default());
        let surface = unsafe { instance.create_surface(window) }?;
        let adapter = instance.request_adapter(&RequestAdapterOptions {
            compatible_surface: Some(&surface),
            ..Default::default()
        })
            .await
            .ok_or(PresenterError::NoAdapter)?;
        let (device, queue) = adapter.request_device(&DeviceDescriptor::default(), None).await?;
        debug!(target: "app", "Adapter: {:?}", adapter.get_info());

        Ok((Gpu { _instance: instance, adapter, device, queue }, surface))
    }
}
